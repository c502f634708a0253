use crate::error::ValidationError;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;
pub const DEFAULT_DURATION_HOURS: u32 = 24;

/// A poll attached to a post. Polls are rendered into the post body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub question: String,
    pub options: Vec<String>,
    pub duration_hours: u32,
}

impl Poll {
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        duration_hours: u32,
    ) -> Result<Self, ValidationError> {
        let question = question.into().trim().to_string();
        if question.is_empty() {
            return Err(ValidationError::EmptyPollQuestion);
        }
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(ValidationError::PollOptionCount {
                min: MIN_OPTIONS,
                max: MAX_OPTIONS,
            });
        }
        let options: Vec<String> = options.iter().map(|o| o.trim().to_string()).collect();
        if options.iter().any(|o| o.is_empty()) {
            return Err(ValidationError::EmptyPollOption);
        }

        Ok(Self {
            question,
            options,
            duration_hours,
        })
    }

    /// Append the poll block to `content`.
    pub fn render_into(&self, content: &str) -> String {
        format!(
            "{}\n\nPoll: {}\nOptions: {}\nDuration: {}h",
            content,
            self.question,
            self.options.join(", "),
            self.duration_hours
        )
    }
}
