//! SurrealDB implementations of the `convene-core` repository traits.

mod attendee;
mod event;
mod membership;
mod organization;
mod user;

pub use attendee::SurrealAttendeeRepository;
pub use event::SurrealEventRepository;
pub use membership::SurrealMembershipRepository;
pub use organization::SurrealOrganizationRepository;
pub use user::SurrealUserRepository;
