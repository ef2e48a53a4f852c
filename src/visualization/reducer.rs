use super::state::{DirectionalSettings, DirectionalSource, HandPose, ReducerMemory, VisualState};
use crate::calibration::session::AXIS_THRESHOLD;
use crate::controller::Snapshot;
use crate::mapping::{LogicalInput, Mapping, PhysicalInput};

/// Which pressed entry to fall back on when the remembered one is gone
#[derive(Debug, Clone, Copy)]
enum Fallback {
    First,
    Last,
}

/// Computes the frame's visual state from the mapping and a reading.
///
/// Pure: everything carried between frames goes in and out through
/// [`ReducerMemory`].
pub fn reduce(
    mapping: &Mapping,
    snapshot: &Snapshot,
    settings: &DirectionalSettings,
    memory: &ReducerMemory,
) -> (VisualState, ReducerMemory) {
    let (stick_x, stick_y) = stick_direction(snapshot, settings);

    let directionals = LogicalInput::DIRECTIONALS.map(|role| {
        let from_stick = match role {
            LogicalInput::Left => stick_x == -1,
            LogicalInput::Right => stick_x == 1,
            LogicalInput::Up => stick_y == -1,
            LogicalInput::Down => stick_y == 1,
            _ => false,
        };
        match settings.directional_source {
            DirectionalSource::Axes => from_stick,
            DirectionalSource::Buttons => from_stick || role_active(mapping, role, snapshot),
        }
    });
    let actions = LogicalInput::ACTIONS.map(|role| role_active(mapping, role, snapshot));

    let [left, right, up, down] = directionals;
    let last_directional = sticky_choice(
        &directionals,
        &memory.previous_directionals,
        memory.last_directional,
        Fallback::First,
    );
    let last_action = sticky_choice(
        &actions,
        &memory.previous_actions,
        memory.last_action,
        Fallback::Last,
    );

    let state = VisualState {
        active_actions: LogicalInput::ACTIONS
            .iter()
            .zip(actions)
            .filter(|(_, pressed)| *pressed)
            .map(|(role, _)| *role)
            .collect(),
        directional_x: resolve_pair(left, right),
        directional_y: resolve_pair(up, down),
        arm_index: last_action,
        hand_pose: last_directional
            .map(|index| HandPose::for_direction(LogicalInput::DIRECTIONALS[index]))
            .unwrap_or_default(),
    };

    let memory = ReducerMemory {
        last_action,
        last_directional,
        previous_actions: actions,
        previous_directionals: directionals,
    };

    (state, memory)
}

/// Whether the input bound to `role` is active; unbound roles never are
pub fn role_active(mapping: &Mapping, role: LogicalInput, snapshot: &Snapshot) -> bool {
    mapping
        .get(role)
        .is_some_and(|input| input_active(input, snapshot))
}

pub fn input_active(input: PhysicalInput, snapshot: &Snapshot) -> bool {
    match input {
        PhysicalInput::Button(index) => snapshot.button_pressed(index),
        PhysicalInput::Axis { index, direction } => snapshot
            .axis(index)
            .is_some_and(|value| value * direction.sign() > AXIS_THRESHOLD),
    }
}

// Opposite directions cancel out
fn resolve_pair(negative: bool, positive: bool) -> i8 {
    match (negative, positive) {
        (true, false) => -1,
        (false, true) => 1,
        _ => 0,
    }
}

fn stick_direction(snapshot: &Snapshot, settings: &DirectionalSettings) -> (i8, i8) {
    let read = |index: usize, invert: bool| {
        let sign = if invert { -1.0 } else { 1.0 };
        snapshot
            .axis(index)
            .map(|value| round_half_up(value * sign))
            .unwrap_or(0)
    };
    (
        read(settings.axis_index_x, settings.invert_x),
        read(settings.axis_index_y, settings.invert_y),
    )
}

// Halves round towards +infinity, so -0.5 is 0 and 0.5 is 1
fn round_half_up(value: f32) -> i8 {
    (value + 0.5).floor().clamp(-1.0, 1.0) as i8
}

/// Prefers the most recently pressed entry while it is held, otherwise falls
/// back on the first or last pressed one. `None` when nothing is pressed.
fn sticky_choice(
    current: &[bool],
    previous: &[bool],
    remembered: Option<usize>,
    fallback: Fallback,
) -> Option<usize> {
    let newly_pressed = current
        .iter()
        .zip(previous)
        .enumerate()
        .filter(|(_, (now, before))| **now && !**before)
        .map(|(index, _)| index)
        .last();

    match newly_pressed.or(remembered) {
        Some(index) if current.get(index).copied().unwrap_or(false) => Some(index),
        _ => match fallback {
            Fallback::First => current.iter().position(|pressed| *pressed),
            Fallback::Last => current.iter().rposition(|pressed| *pressed),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::AxisDirection;

    const BUTTONS: usize = 16;

    // default bindings: Up 12, Down 13, Left 14, Right 15,
    // Action1 1, Action3 7, Action5 0, Action8 4
    fn run(
        mapping: &Mapping,
        settings: &DirectionalSettings,
        frames: &[Snapshot],
    ) -> Vec<VisualState> {
        let mut memory = ReducerMemory::default();
        frames
            .iter()
            .map(|snapshot| {
                let (state, next) = reduce(mapping, snapshot, settings, &memory);
                memory = next;
                state
            })
            .collect()
    }

    fn pressing(buttons: &[usize]) -> Snapshot {
        Snapshot::with_pressed(BUTTONS, buttons, vec![0.0; 4])
    }

    #[test]
    fn left_button_drives_x_and_hand_pose() {
        let mapping = Mapping::default_bindings();
        let states = run(
            &mapping,
            &DirectionalSettings::default(),
            &[pressing(&[14]), pressing(&[])],
        );

        assert_eq!(states[0].directional_x, -1);
        assert_eq!(states[0].hand_pose, HandPose::Left);
        assert_eq!(states[0].hand_pose.index(), 1);

        assert_eq!(states[1].directional_x, 0);
        assert_eq!(states[1].hand_pose, HandPose::Neutral);
        assert_eq!(states[1].hand_pose.index(), 0);
    }

    #[test]
    fn opposite_directions_cancel() {
        let mapping = Mapping::default_bindings();
        let states = run(
            &mapping,
            &DirectionalSettings::default(),
            &[pressing(&[14, 15]), pressing(&[13, 12])],
        );
        assert_eq!(states[0].directional_x, 0);
        assert_eq!(states[1].directional_y, 0);
    }

    #[test]
    fn hand_follows_newest_directional() {
        let mapping = Mapping::default_bindings();
        let states = run(
            &mapping,
            &DirectionalSettings::default(),
            &[
                pressing(&[13]),     // down
                pressing(&[13, 14]), // + left
                pressing(&[13, 14]),
                pressing(&[13]), // left let go
            ],
        );

        assert_eq!(states[0].hand_pose, HandPose::Down);
        assert_eq!(states[1].hand_pose, HandPose::Left);
        assert_eq!(states[2].hand_pose, HandPose::Left);
        assert_eq!(states[3].hand_pose, HandPose::Down);
        assert_eq!(states[1].directional_x, -1);
        assert_eq!(states[1].directional_y, 1);
    }

    #[test]
    fn arm_prefers_newest_then_highest() {
        let mapping = Mapping::default_bindings();
        let settings = DirectionalSettings::default();
        let states = run(
            &mapping,
            &settings,
            &[
                pressing(&[7]),    // action3
                pressing(&[7, 0]), // + action5
                pressing(&[7]),    // action5 let go
                pressing(&[]),
            ],
        );

        assert_eq!(states[0].arm_index, Some(2));
        assert_eq!(states[1].arm_index, Some(4));
        assert_eq!(states[2].arm_index, Some(2));
        assert_eq!(states[3].arm_index, None);
        assert!(states[3].active_actions.is_empty());

        assert!(states[1].is_active(LogicalInput::Action3));
        assert!(states[1].is_active(LogicalInput::Action5));
        assert_eq!(states[1].active_actions.len(), 2);
    }

    #[test]
    fn arm_sticks_to_newest_even_if_lower() {
        let mapping = Mapping::default_bindings();
        let states = run(
            &mapping,
            &DirectionalSettings::default(),
            &[
                pressing(&[4]),    // action8
                pressing(&[4, 1]), // + action1
                pressing(&[4, 1]),
            ],
        );
        assert_eq!(states[0].arm_index, Some(7));
        assert_eq!(states[1].arm_index, Some(0));
        assert_eq!(states[2].arm_index, Some(0));
    }

    #[test]
    fn chord_pressed_together_picks_highest() {
        let mapping = Mapping::default_bindings();
        let states = run(
            &mapping,
            &DirectionalSettings::default(),
            &[pressing(&[1, 4])],
        );
        assert_eq!(states[0].arm_index, Some(7));
    }

    #[test]
    fn stick_drives_directionals() {
        let mapping = Mapping::default_bindings();
        let settings = DirectionalSettings::default();
        let tilted = Snapshot::with_pressed(BUTTONS, &[], vec![0.7, -0.9, 0.0, 0.0]);
        let slight = Snapshot::with_pressed(BUTTONS, &[], vec![0.4, -0.49, 0.0, 0.0]);

        let states = run(&mapping, &settings, &[tilted, slight]);
        assert_eq!(states[0].directional_x, 1);
        assert_eq!(states[0].directional_y, -1);
        // right and up start together, the later one in scan order wins
        assert_eq!(states[0].hand_pose, HandPose::Up);
        assert_eq!(states[1].directional_x, 0);
        assert_eq!(states[1].directional_y, 0);
    }

    #[test]
    fn dpad_and_stick_agree_on_vertical() {
        let mapping = Mapping::default_bindings();
        let settings = DirectionalSettings::default();
        let idle = vec![0.0; 4];

        let dpad_down = run(&mapping, &settings, &[Snapshot::with_pressed(17, &[13], idle.clone())]);
        let stick_down = run(
            &mapping,
            &settings,
            &[Snapshot::with_pressed(17, &[], vec![0.0, 1.0, 0.0, 0.0])],
        );
        assert_eq!(dpad_down[0].directional_y, 1);
        assert_eq!(stick_down[0].directional_y, 1);
        assert_eq!(dpad_down[0].hand_pose, HandPose::Down);
        assert_eq!(stick_down[0].hand_pose, HandPose::Down);

        let dpad_up = run(&mapping, &settings, &[Snapshot::with_pressed(17, &[12], idle)]);
        let stick_up = run(
            &mapping,
            &settings,
            &[Snapshot::with_pressed(17, &[], vec![0.0, -1.0, 0.0, 0.0])],
        );
        assert_eq!(dpad_up[0].directional_y, -1);
        assert_eq!(stick_up[0].directional_y, -1);
        assert_eq!(dpad_up[0].hand_pose, HandPose::Up);
        assert_eq!(stick_up[0].hand_pose, HandPose::Up);
    }

    #[test]
    fn inverted_stick_and_axes_only_mode() {
        let mapping = Mapping::default_bindings();
        let settings = DirectionalSettings {
            directional_source: DirectionalSource::Axes,
            axis_index_x: 2,
            invert_x: true,
            ..DirectionalSettings::default()
        };

        // left button is ignored, axis 2 pushed right reads as left
        let snapshot = Snapshot::with_pressed(BUTTONS, &[15], vec![0.0, 0.0, 1.0, 0.0]);
        let states = run(&mapping, &settings, &[snapshot]);
        assert_eq!(states[0].directional_x, -1);
        assert_eq!(states[0].hand_pose, HandPose::Left);
    }

    #[test]
    fn axis_bound_action_uses_its_direction() {
        let mut mapping = Mapping::default_bindings();
        mapping.bind(
            LogicalInput::Action2,
            PhysicalInput::Axis {
                index: 3,
                direction: AxisDirection::Negative,
            },
        );

        let pushed_down = Snapshot::with_pressed(BUTTONS, &[], vec![0.0, 0.0, 0.0, -0.8]);
        let pushed_up = Snapshot::with_pressed(BUTTONS, &[], vec![0.0, 0.0, 0.0, 0.8]);
        let states = run(
            &mapping,
            &DirectionalSettings::default(),
            &[pushed_down, pushed_up],
        );

        assert_eq!(states[0].arm_index, Some(1));
        assert_eq!(states[1].arm_index, None);
    }

    #[test]
    fn missing_indices_read_as_released() {
        let mapping = Mapping::default_bindings();
        let tiny = Snapshot::with_pressed(4, &[0, 1, 2, 3], vec![]);
        let states = run(&mapping, &DirectionalSettings::default(), &[tiny]);

        assert_eq!(states[0].directional_x, 0);
        assert_eq!(states[0].hand_pose, HandPose::Neutral);
        // buttons 0..3 are actions 5, 1, 2, 6
        assert_eq!(states[0].active_actions.len(), 4);
    }

    #[test]
    fn half_rounds_up() {
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-0.51), -1);
        assert_eq!(round_half_up(0.49), 0);
    }
}
