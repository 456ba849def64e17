pub mod health;
pub mod mail;
pub mod notification;
pub mod response;
pub mod retry;
pub mod template;
