// ABOUTME: Plain-text rendering of a channel's deploy history.
// ABOUTME: One line per deploy, times in RFC 822 layout at a fixed display offset.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::deploy::Deploy;

pub const HEADER: &str = "Deploy history\n--------------\n";
pub const NO_DEPLOYS: &str = "No deploys in channel so far";

/// Renders deploy history as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    offset: FixedOffset,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }
}

impl Renderer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Render a chronological list of deploys.
    pub fn render(&self, deploys: &[Deploy]) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');

        if deploys.is_empty() {
            out.push_str(NO_DEPLOYS);
            out.push('\n');
            return out;
        }

        for deploy in deploys {
            out.push_str(&self.render_line(deploy));
            out.push('\n');
        }
        out
    }

    /// A single history line for `deploy`.
    pub fn render_line(&self, deploy: &Deploy) -> String {
        let started = self.format_time(deploy.started_at());

        let Some(finished_at) = deploy.finished_at() else {
            return format!(
                "* {} is currently deploying {} since {}",
                deploy.user(),
                deploy.subject(),
                started
            );
        };

        let mut line = format!(
            "* {} was deploying {} since {} until {}",
            deploy.user(),
            deploy.subject(),
            started,
            self.format_time(finished_at)
        );
        match deploy.abort_reason() {
            Some("") => line.push_str(" (aborted)"),
            Some(reason) => line.push_str(&format!(" (aborted, {})", reason)),
            None => {}
        }
        line
    }

    /// Format a timestamp as `02 Jan 06 15:04 MST` in the display offset.
    pub fn format_time(&self, time: DateTime<Utc>) -> String {
        let local = time.with_timezone(&self.offset);
        let zone = if self.offset.local_minus_utc() == 0 {
            "UTC".to_string()
        } else {
            local.format("%z").to_string()
        };
        format!("{} {}", local.format("%d %b %y %H:%M"), zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::PendingDeploy;
    use crate::types::User;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 8, 4, 9, minute, 0).unwrap()
    }

    fn finished(subject: &str, start: u32, end: u32) -> Deploy {
        let mut deploy =
            PendingDeploy::new(User::new("1", "Test User"), subject).start_at(at(start));
        deploy.finish_at(at(end)).unwrap();
        deploy
    }

    #[test]
    fn empty_history_has_fixed_message() {
        let text = Renderer::default().render(&[]);
        assert_eq!(
            text,
            "Deploy history\n--------------\n\nNo deploys in channel so far\n"
        );
    }

    #[test]
    fn finished_deploy_line() {
        let text = Renderer::default().render(&[finished("Test deploy", 28, 38)]);
        assert_eq!(
            text.lines().last().unwrap(),
            "* Test User was deploying Test deploy since 04 Aug 16 09:28 UTC until 04 Aug 16 09:38 UTC"
        );
    }

    #[test]
    fn aborted_lines_carry_reason_suffix() {
        let renderer = Renderer::default();

        let mut silent = PendingDeploy::new(User::new("1", "Test User"), "Second deploy")
            .start_at(at(39));
        silent.abort_at("", at(40)).unwrap();
        assert!(renderer.render_line(&silent).ends_with("until 04 Aug 16 09:40 UTC (aborted)"));

        let mut loud =
            PendingDeploy::new(User::new("1", "Test User"), "Third deploy").start_at(at(42));
        loud.abort_at("something went wrong", at(43)).unwrap();
        assert!(
            renderer
                .render_line(&loud)
                .ends_with("(aborted, something went wrong)")
        );
    }

    #[test]
    fn in_progress_line_has_start_only() {
        let deploy =
            PendingDeploy::new(User::new("2", "Another User"), "Forth deploy").start_at(at(50));
        assert_eq!(
            Renderer::default().render_line(&deploy),
            "* Another User is currently deploying Forth deploy since 04 Aug 16 09:50 UTC"
        );
    }

    #[test]
    fn times_use_display_offset() {
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        let renderer = Renderer::new(cest);
        assert_eq!(renderer.format_time(at(28)), "04 Aug 16 11:28 +0200");
    }
}
