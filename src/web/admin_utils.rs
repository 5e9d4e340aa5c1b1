/// Compose a flash message HTML snippet for known admin status or error codes.
pub fn compose_flash_message(status: Option<&str>, error: Option<&str>) -> String {
    if let Some(status) = status {
        let message = match status {
            "logged_out" => "You have been signed out.",
            "expired" => "Your session expired. Please sign in again.",
            "reset_requested" => {
                "If that email belongs to an administrator, reset instructions will follow."
            }
            "password_updated" => "Password updated.",
            "area_saved" => "Area added.",
            "area_deleted" => "Area removed.",
            "service_saved" => "Service added.",
            "service_deleted" => "Service removed.",
            "template_saved" => "Template saved.",
            "template_deleted" => "Template deleted.",
            _ => "",
        };

        if !message.is_empty() {
            let class = if status == "expired" { "error" } else { "success" };
            return format!(r#"<div class="flash {class}">{message}</div>"#);
        }
    }

    if let Some(error) = error {
        let message = match error {
            "not_authorized" => "Your role does not have access to that page.",
            "invalid_credentials" => "Invalid email or password.",
            "missing_email" => "Please enter your email address.",
            "password_too_short" => "The new password must be at least 8 characters.",
            "password_mismatch" => "The passwords do not match.",
            "reset_failed" => "The password could not be updated. Please sign in again.",
            "missing_name" => "Please enter a name.",
            "duplicate" => "That name already exists.",
            "template_missing_fields" => "Please fill in the template name and content.",
            "template_not_found" => "That template no longer exists.",
            "storage_failed" => "The change could not be saved. Check the server logs.",
            _ => "Something went wrong. Check the server logs.",
        };

        return format!(r#"<div class="flash error">{message}</div>"#);
    }

    String::new()
}
