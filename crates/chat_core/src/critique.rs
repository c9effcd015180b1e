/// One scored criterion of a critique.
#[derive(Debug, Clone, PartialEq)]
pub struct CritiqueSection {
    pub name: String,
    pub score: Option<f64>,
    pub reason: String,
}

/// Server-computed quality evaluation of a generated response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Critique {
    pub total_score: Option<f64>,
    pub sections: Vec<CritiqueSection>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegeneratedCritique {
    pub total_score: Option<f64>,
}

/// Critique data decoded from a finalized message's detail record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CritiqueSnapshot {
    pub critique: Option<Critique>,
    pub regenerated_content: Option<String>,
    pub regenerated_critique: Option<RegeneratedCritique>,
}

impl CritiqueSnapshot {
    /// A critique or a regenerated response is what the critic loop waits for.
    pub fn has_news(&self) -> bool {
        self.critique.is_some() || self.regenerated_content.is_some()
    }
}

/// Badge text for a critic score. Negative scores are the backend's
/// "could not score" sentinel.
pub fn format_score(score: f64) -> String {
    if score < 0.0 {
        "unscored".to_string()
    } else {
        format!("{score:.1}")
    }
}
