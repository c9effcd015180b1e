use std::fmt;

/// Pipeline status reported by the status endpoint for a pending turn.
///
/// The set is closed. Variants are declared in progression order; see
/// [`StatusCode::rank`] for how alternatives (`ner_completed | ner_error`)
/// share a position in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    ProcessingStarted,
    NerStarted,
    NerCompleted,
    NerError,
    SearchStarted,
    SearchCallCompleted,
    SearchCompleted,
    SearchError,
    GeneratingResponse,
    ResponseGenerated,
    ResponseError,
    Completed,
    Error,
}

impl StatusCode {
    pub const ALL: [StatusCode; 13] = [
        StatusCode::ProcessingStarted,
        StatusCode::NerStarted,
        StatusCode::NerCompleted,
        StatusCode::NerError,
        StatusCode::SearchStarted,
        StatusCode::SearchCallCompleted,
        StatusCode::SearchCompleted,
        StatusCode::SearchError,
        StatusCode::GeneratingResponse,
        StatusCode::ResponseGenerated,
        StatusCode::ResponseError,
        StatusCode::Completed,
        StatusCode::Error,
    ];

    /// Decodes the wire name of a status.
    ///
    /// `processing` is what the backend reports while the record is being
    /// updated and no stage has been stored yet; it is the same position as
    /// `processing_started`.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = match raw.trim() {
            "processing_started" | "processing" => StatusCode::ProcessingStarted,
            "ner_started" => StatusCode::NerStarted,
            "ner_completed" => StatusCode::NerCompleted,
            "ner_error" => StatusCode::NerError,
            "search_started" => StatusCode::SearchStarted,
            "search_call_completed" => StatusCode::SearchCallCompleted,
            "search_completed" => StatusCode::SearchCompleted,
            "search_error" => StatusCode::SearchError,
            "generating_response" => StatusCode::GeneratingResponse,
            "response_generated" => StatusCode::ResponseGenerated,
            "response_error" => StatusCode::ResponseError,
            "completed" => StatusCode::Completed,
            "error" => StatusCode::Error,
            _ => return None,
        };
        Some(code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::ProcessingStarted => "processing_started",
            StatusCode::NerStarted => "ner_started",
            StatusCode::NerCompleted => "ner_completed",
            StatusCode::NerError => "ner_error",
            StatusCode::SearchStarted => "search_started",
            StatusCode::SearchCallCompleted => "search_call_completed",
            StatusCode::SearchCompleted => "search_completed",
            StatusCode::SearchError => "search_error",
            StatusCode::GeneratingResponse => "generating_response",
            StatusCode::ResponseGenerated => "response_generated",
            StatusCode::ResponseError => "response_error",
            StatusCode::Completed => "completed",
            StatusCode::Error => "error",
        }
    }

    /// Position in the pipeline progression. Alternatives reached from the
    /// same predecessor share a rank; `error` outranks everything because it
    /// is reachable from any state and nothing follows it.
    pub fn rank(self) -> u8 {
        match self {
            StatusCode::ProcessingStarted => 0,
            StatusCode::NerStarted => 1,
            StatusCode::NerCompleted | StatusCode::NerError => 2,
            StatusCode::SearchStarted => 3,
            StatusCode::SearchCallCompleted => 4,
            StatusCode::SearchCompleted | StatusCode::SearchError => 5,
            StatusCode::GeneratingResponse => 6,
            StatusCode::ResponseGenerated | StatusCode::ResponseError => 7,
            StatusCode::Completed => 8,
            StatusCode::Error => 9,
        }
    }

    /// Whether observing `next` after `self` respects the progression.
    /// Skips are allowed, repeats are not progress, going back never is.
    pub fn can_advance_to(self, next: StatusCode) -> bool {
        next != self && next.rank() >= self.rank() && !self.is_failure_terminal()
    }

    /// Statuses on which the status loop may stop, provided the snapshot
    /// also carries content.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StatusCode::ResponseGenerated
                | StatusCode::ResponseError
                | StatusCode::Completed
                | StatusCode::Error
        )
    }

    fn is_failure_terminal(self) -> bool {
        self == StatusCode::Error
    }

    pub fn is_stage_error(self) -> bool {
        matches!(
            self,
            StatusCode::NerError
                | StatusCode::SearchError
                | StatusCode::ResponseError
                | StatusCode::Error
        )
    }

    /// Short human label for the status panel.
    pub fn label(self) -> &'static str {
        match self {
            StatusCode::ProcessingStarted => "Processing your request",
            StatusCode::NerStarted => "Extracting preferences",
            StatusCode::NerCompleted => "Preferences extracted",
            StatusCode::NerError => "Could not extract preferences",
            StatusCode::SearchStarted => "Deciding whether to search",
            StatusCode::SearchCallCompleted => "Searching",
            StatusCode::SearchCompleted => "Search finished",
            StatusCode::SearchError => "Search failed",
            StatusCode::GeneratingResponse => "Writing a response",
            StatusCode::ResponseGenerated => "Response ready",
            StatusCode::ResponseError => "Response generation failed",
            StatusCode::Completed => "Completed",
            StatusCode::Error => "Something went wrong",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for code in StatusCode::ALL {
            assert_eq!(StatusCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(StatusCode::parse("processing"), Some(StatusCode::ProcessingStarted));
        assert_eq!(StatusCode::parse("not_found"), None);
    }

    #[test]
    fn alternatives_do_not_advance_into_each_other_backwards() {
        assert!(StatusCode::NerStarted.can_advance_to(StatusCode::NerError));
        assert!(StatusCode::NerError.can_advance_to(StatusCode::SearchStarted));
        assert!(!StatusCode::SearchStarted.can_advance_to(StatusCode::NerCompleted));
        assert!(StatusCode::SearchStarted.can_advance_to(StatusCode::Error));
        assert!(!StatusCode::Error.can_advance_to(StatusCode::Completed));
        assert!(!StatusCode::Completed.can_advance_to(StatusCode::Completed));
    }
}
