//! Dialcast SIP library
//!
//! Outbound calling on top of the rvoip client stack: register with the provider,
//! dial one number at a time, stream PCMU audio, hang up. The campaign runner only
//! sees the [`Softphone`] and [`PhoneFactory`] traits.

pub mod error;
pub mod local_ip;
pub mod phone;
pub mod softphone;

pub use error::SipError;
pub use local_ip::detect_local_ip;
pub use phone::{CallHandle, PhoneFactory, PhoneParams, Softphone, PCMU_FRAME_BYTES};
pub use softphone::{SipPhoneFactory, SipSoftphone};
