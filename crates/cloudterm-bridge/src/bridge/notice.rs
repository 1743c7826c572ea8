/// Text rendered into the terminal when the remote host ends the session.
pub(super) fn close_notice(code: u16, reason: &str) -> String {
    let mut notice = format!("\r\nConnection terminated by remote host. ({code})\r\n");
    if !reason.trim().is_empty() {
        notice.push_str("Reason: ");
        notice.push_str(reason);
    }
    notice
}
