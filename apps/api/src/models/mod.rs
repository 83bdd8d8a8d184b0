pub mod agent;
pub mod lenient;
pub mod referral;
