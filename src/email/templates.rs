use super::PasswordResetMail;

pub const PASSWORD_RESET_SUBJECT: &str = "Password reset";

pub fn render_password_reset(mail: &PasswordResetMail) -> String {
    let PasswordResetMail {
        token,
        reset_url,
        valid_for_hours,
        ..
    } = mail;

    format!(
        "A password reset was requested for your account.\n\
         \n\
         Reset your password here:\n\
         {reset_url}\n\
         \n\
         Or submit this token: {token}\n\
         \n\
         It expires in {valid_for_hours} hours. If you didn't request this, you can ignore it.\n"
    )
}
