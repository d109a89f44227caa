use std::fmt::Display;

use error_stack::Context;

use crate::entity::{ExpectedRentalOn, ExpectedReturnOn, RentalStatus};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Transition {
    Allow,
    Deny,
}

// Rows are the previous status, columns the proposed one, both by ordinal.
const TRANSITIONS: [[Transition; 4]; 4] = {
    use Transition::{Allow, Deny};
    [
        // RENT_WAIT, RENTING, RETURNED, CANCELED
        [Allow, Allow, Deny, Allow],
        [Deny, Allow, Allow, Deny],
        [Deny, Deny, Allow, Deny],
        [Deny, Deny, Deny, Allow],
    ]
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TransitionError {
    previous: RentalStatus,
    proposed: RentalStatus,
}

impl TransitionError {
    pub fn previous(&self) -> RentalStatus {
        self.previous
    }

    pub fn proposed(&self) -> RentalStatus {
        self.proposed
    }
}

impl Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rental status cannot be changed from {} to {}",
            self.previous, self.proposed
        )
    }
}

impl Context for TransitionError {}

/// Checks whether a rental currently in `previous` may be edited to `proposed`.
///
/// Re-submitting the current status is always accepted.
pub fn validate_transition(
    previous: RentalStatus,
    proposed: RentalStatus,
) -> Option<TransitionError> {
    match TRANSITIONS[previous.ordinal() as usize][proposed.ordinal() as usize] {
        Transition::Allow => None,
        Transition::Deny => Some(TransitionError { previous, proposed }),
    }
}

impl RentalStatus {
    pub fn can_transition_to(&self, proposed: RentalStatus) -> bool {
        validate_transition(*self, proposed).is_none()
    }

    /// No status other than itself is reachable.
    pub fn is_terminal(&self) -> bool {
        RentalStatus::ALL
            .into_iter()
            .filter(|other| other != self)
            .all(|other| !self.can_transition_to(other))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ScheduleError {
    expected_rental_on: ExpectedRentalOn,
    expected_return_on: ExpectedReturnOn,
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected return date {} is before expected rental date {}",
            self.expected_return_on.as_ref(),
            self.expected_rental_on.as_ref()
        )
    }
}

impl Context for ScheduleError {}

pub fn validate_schedule(
    expected_rental_on: &ExpectedRentalOn,
    expected_return_on: &ExpectedReturnOn,
) -> Option<ScheduleError> {
    if expected_return_on.as_ref() < expected_rental_on.as_ref() {
        Some(ScheduleError {
            expected_rental_on: *expected_rental_on,
            expected_return_on: *expected_return_on,
        })
    } else {
        None
    }
}
