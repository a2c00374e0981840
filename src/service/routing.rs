// Keyword classification used when the model is unreachable, so the
// fallback reply can still point the user at a working phrasing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Availability,
    Schedule,
    DaySchedule,
    SendEmail,
    GenerateMom,
    Unknown,
}

pub fn route_intent(text: &str) -> Intent {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return Intent::Unknown;
    }

    if lower.contains("mom") || lower.contains("minutes") || lower.contains("transcript") {
        return Intent::GenerateMom;
    }

    if lower.contains("email") || lower.contains("mail ") || lower.ends_with("mail") {
        return Intent::SendEmail;
    }

    if lower.contains("free") || lower.contains("available") || lower.contains("availability") {
        return Intent::Availability;
    }

    if lower.contains("my schedule") || lower.contains("agenda") || lower.contains("what's on") {
        return Intent::DaySchedule;
    }

    if lower.contains("schedule") || lower.contains("book") || lower.contains("set up a meeting") {
        return Intent::Schedule;
    }

    Intent::Unknown
}

pub fn fallback_reply(intent: Intent) -> String {
    let hint = match intent {
        Intent::Availability => "Try: \"is arun free on 2026-03-02 at 10:00\"",
        Intent::Schedule => {
            "Try: \"schedule meeting Project Sync on 2026-03-02 at 10:00 for 30 minutes with arun\""
        }
        Intent::DaySchedule => "Try: \"what's my schedule on 2026-03-02\"",
        Intent::SendEmail => "Try: \"send email to arun\"",
        Intent::GenerateMom => "Try: \"generate mom from <transcript>\"",
        Intent::Unknown => "Type \"help\" to see what I can do.",
    };
    format!(
        "Sorry, I couldn't reach the language model right now. {}",
        hint
    )
}

pub fn is_help_command(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "help" | "hi" | "hello" | "start" | "menu"
    )
}

pub fn is_status_command(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("status")
}

pub fn help_message() -> String {
    "Meeting Scheduler Bot\n\n\
     I can help you with:\n\
     - Check availability\n\
     - Schedule meetings\n\
     - Send emails\n\
     - Get schedule\n\
     - Generate MoM\n\n\
     Examples:\n\
     - \"is arun free on 2026-03-02 at 10:00\"\n\
     - \"schedule meeting today at 14:00\"\n\
     - \"send email to arun\"\n\
     - \"what's my schedule on 2026-03-02\"\n\n\
     Type \"status\" to check if I'm working."
        .to_string()
}

pub fn status_message() -> String {
    "Meeting Scheduler Bot is online and ready to help!".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_keywords_win_over_schedule() {
        assert_eq!(
            route_intent("is arun free on 2026-03-02 at 10:00"),
            Intent::Availability
        );
    }

    #[test]
    fn mom_beats_email() {
        assert_eq!(
            route_intent("generate mom and email it to arun"),
            Intent::GenerateMom
        );
    }

    #[test]
    fn help_and_status_commands() {
        assert!(is_help_command(" Hello "));
        assert!(is_status_command("STATUS"));
        assert!(!is_help_command("helpful"));
    }
}
