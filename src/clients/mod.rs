pub mod api_mailer;
pub mod mailer;
pub mod smtp;
