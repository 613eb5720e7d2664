use lane_defence_core::AttackerState;

/// Observations that drive a single state machine evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stimulus {
    /// Health reached zero.
    pub health_depleted: bool,
    /// The attacker stands on or past the objective boundary.
    pub objective_reached: bool,
    /// The opt-in special ability is ready to start.
    pub special_triggered: bool,
    /// The running special ability used up its duration.
    pub special_finished: bool,
    /// A defender stands within melee range ahead of the attacker.
    pub melee_target: bool,
    /// A defender stands within ranged attack range.
    pub ranged_target: bool,
}

/// Computes the state that follows `state` under the provided stimulus.
///
/// Dying is terminal. Depleted health wins over every other observation.
#[must_use]
pub fn transition(state: AttackerState, stimulus: &Stimulus) -> AttackerState {
    use AttackerState::{Dying, Engaging, Moving, RangedAttacking, Special};

    match state {
        Dying => Dying,
        _ if stimulus.health_depleted => Dying,
        Moving | Special if stimulus.objective_reached => Dying,
        Moving | Engaging | RangedAttacking if stimulus.special_triggered => Special,
        Special if stimulus.special_finished => Moving,
        Special => Special,
        Moving | RangedAttacking if stimulus.melee_target => Engaging,
        Moving | RangedAttacking if stimulus.ranged_target => RangedAttacking,
        Engaging if stimulus.melee_target => Engaging,
        Moving | Engaging | RangedAttacking => Moving,
    }
}
