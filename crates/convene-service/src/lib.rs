//! Convene Service — the cross-entity consistency core.
//!
//! Each service owns one entity's lifecycle and enforces the
//! invariants that tie the entities together: organization creation
//! provisions the creator's membership atomically, memberships and
//! attendees are unique per composite key, event scheduling rejects
//! overlapping intervals (or validates the parent organization,
//! depending on the configured policy), and status/RSVP transitions
//! are gated on the acting user.
//!
//! Services are generic over the `convene-core` repository traits so
//! this crate has no dependency on the database crate. All validation
//! runs before any write; the first failing check short-circuits.

pub mod attendee;
pub mod event;
pub mod membership;
pub mod organization;
pub mod user;

pub use attendee::AttendeeService;
pub use event::{ConflictPolicy, EventService};
pub use membership::MembershipService;
pub use organization::OrganizationService;
pub use user::UserService;
