mod countdown;
mod waitlist_email;

pub use countdown::Countdown;
pub use waitlist_email::{looks_like_email, normalize, WaitlistEmail};
