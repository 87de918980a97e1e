//! Profile curve and validation

use core::fmt;

use heapless::{String, Vec};

use super::phase::{Phase, PhaseKind};
use super::{MAX_LABEL_LEN, MAX_PHASES, MAX_POINTS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One vertex of the target curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfilePoint {
    /// Seconds since run start
    pub elapsed_s: f32,
    /// Target oven temperature (°C)
    pub target_c: f32,
}

impl ProfilePoint {
    pub const fn new(elapsed_s: f32, target_c: f32) -> Self {
        Self {
            elapsed_s,
            target_c,
        }
    }
}

/// Reasons a profile is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileError {
    /// No points given
    Empty,
    /// More than `MAX_POINTS` points
    TooManyPoints,
    /// More than `MAX_PHASES` phases
    TooManyPhases,
    /// Name longer than `MAX_LABEL_LEN`
    NameTooLong,
    /// First point is not at elapsed 0
    FirstPointNotAtZero,
    /// Elapsed times are not strictly increasing
    NotIncreasing,
    /// A time or temperature is NaN or infinite
    NonFinite,
    /// Phases leave a gap, overlap, or do not end at the final point
    PhasesNotContiguous,
    /// A phase has no duration
    EmptyPhase,
    /// A target temperature reaches the safety ceiling
    ExceedsCeiling,
    /// Another profile already uses this name
    DuplicateName,
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProfileError::Empty => "profile has no points",
            ProfileError::TooManyPoints => "profile has too many points",
            ProfileError::TooManyPhases => "profile has too many phases",
            ProfileError::NameTooLong => "name is too long",
            ProfileError::FirstPointNotAtZero => "first point must be at 0 s",
            ProfileError::NotIncreasing => "point times must be strictly increasing",
            ProfileError::NonFinite => "profile contains a non-finite value",
            ProfileError::PhasesNotContiguous => "phases must cover the whole profile without gaps",
            ProfileError::EmptyPhase => "phase has no duration",
            ProfileError::ExceedsCeiling => "profile target reaches the safety ceiling",
            ProfileError::DuplicateName => "another profile already uses this name",
        };
        f.write_str(text)
    }
}

impl core::error::Error for ProfileError {}

/// A validated reflow profile
///
/// Invariants upheld by [`Profile::new`]:
/// - at least one point, the first at elapsed 0
/// - elapsed strictly increasing, all values finite
/// - at least one phase; phases partition `0..=duration` in order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Profile {
    name: String<MAX_LABEL_LEN>,
    points: Vec<ProfilePoint, MAX_POINTS>,
    phases: Vec<Phase, MAX_PHASES>,
    liquidus_c: Option<f32>,
}

impl Profile {
    /// Validate and build a profile
    ///
    /// An empty `phases` slice yields a single heating phase spanning the
    /// whole curve.
    pub fn new(
        name: &str,
        points: &[ProfilePoint],
        phases: &[Phase],
        liquidus_c: Option<f32>,
    ) -> Result<Self, ProfileError> {
        let mut label = String::new();
        label.push_str(name).map_err(|_| ProfileError::NameTooLong)?;

        let points = validate_points(points)?;
        let duration_s = points[points.len() - 1].elapsed_s;

        let phases = if phases.is_empty() {
            let mut synthesized = Vec::new();
            synthesized
                .push(Phase::new("heating", PhaseKind::Heating, 0.0, duration_s))
                .map_err(|_| ProfileError::TooManyPhases)?;
            synthesized
        } else {
            validate_phases(phases, duration_s)?
        };

        if liquidus_c.is_some_and(|t| !t.is_finite()) {
            return Err(ProfileError::NonFinite);
        }

        Ok(Self {
            name: label,
            points,
            phases,
            liquidus_c,
        })
    }

    /// Profile name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Curve vertices in time order
    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    /// Phases in time order
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Solder liquidus temperature, if declared
    pub fn liquidus_c(&self) -> Option<f32> {
        self.liquidus_c
    }

    /// Elapsed time of the final point (seconds)
    pub fn duration_s(&self) -> f32 {
        self.points[self.points.len() - 1].elapsed_s
    }

    /// Target temperature at `elapsed_s`
    ///
    /// Linear between points, exact at points, clamped to the first point
    /// at or before 0 (and for NaN) and to the last point after the end.
    pub fn interpolate(&self, elapsed_s: f32) -> f32 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];

        // `!(a > b)` also catches NaN
        if !(elapsed_s > first.elapsed_s) {
            return first.target_c;
        }
        if elapsed_s >= last.elapsed_s {
            return last.target_c;
        }

        // 1 <= upper < len, guaranteed by the two checks above
        let upper = self.points.partition_point(|p| p.elapsed_s <= elapsed_s);
        let a = self.points[upper - 1];
        let b = self.points[upper];

        let fraction = (elapsed_s - a.elapsed_s) / (b.elapsed_s - a.elapsed_s);
        a.target_c + (b.target_c - a.target_c) * fraction
    }

    /// Index of the phase containing `elapsed_s`
    ///
    /// Times before the start map to the first phase, times after the end
    /// to the last.
    pub fn phase_index_at(&self, elapsed_s: f32) -> usize {
        self.phases
            .iter()
            .position(|phase| elapsed_s < phase.end_s)
            .unwrap_or(self.phases.len() - 1)
    }

    /// Phase containing `elapsed_s`
    pub fn phase_at(&self, elapsed_s: f32) -> &Phase {
        &self.phases[self.phase_index_at(elapsed_s)]
    }

    /// Reject profiles whose curve reaches `ceiling_c`
    ///
    /// Following such a profile would trip the over-temperature fault by
    /// design, so it is refused at selection time.
    pub fn check_against(&self, ceiling_c: f32) -> Result<(), ProfileError> {
        if self.points.iter().any(|p| p.target_c >= ceiling_c) {
            return Err(ProfileError::ExceedsCeiling);
        }
        Ok(())
    }
}

fn validate_points(points: &[ProfilePoint]) -> Result<Vec<ProfilePoint, MAX_POINTS>, ProfileError> {
    let first = points.first().ok_or(ProfileError::Empty)?;

    if points
        .iter()
        .any(|p| !p.elapsed_s.is_finite() || !p.target_c.is_finite())
    {
        return Err(ProfileError::NonFinite);
    }
    if first.elapsed_s != 0.0 {
        return Err(ProfileError::FirstPointNotAtZero);
    }
    if points.windows(2).any(|w| w[1].elapsed_s <= w[0].elapsed_s) {
        return Err(ProfileError::NotIncreasing);
    }

    Vec::from_slice(points).map_err(|_| ProfileError::TooManyPoints)
}

fn validate_phases(
    phases: &[Phase],
    duration_s: f32,
) -> Result<Vec<Phase, MAX_PHASES>, ProfileError> {
    if phases.len() > MAX_PHASES {
        return Err(ProfileError::TooManyPhases);
    }

    let mut expected_start = 0.0;
    for phase in phases {
        let slope_ok = phase.max_slope.map_or(true, |s| s.is_finite() && s > 0.0);
        if !phase.start_s.is_finite() || !phase.end_s.is_finite() || !slope_ok {
            return Err(ProfileError::NonFinite);
        }
        if phase.start_s != expected_start {
            return Err(ProfileError::PhasesNotContiguous);
        }
        // A zero-length profile has exactly one zero-length phase
        let zero_length_run = duration_s == 0.0 && phases.len() == 1;
        if phase.end_s <= phase.start_s && !zero_length_run {
            return Err(ProfileError::EmptyPhase);
        }
        expected_start = phase.end_s;
    }

    if expected_start != duration_s {
        return Err(ProfileError::PhasesNotContiguous);
    }

    Vec::from_slice(phases).map_err(|_| ProfileError::TooManyPhases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plateau() -> Profile {
        Profile::new(
            "plateau",
            &[
                ProfilePoint::new(0.0, 25.0),
                ProfilePoint::new(60.0, 150.0),
                ProfilePoint::new(120.0, 150.0),
                ProfilePoint::new(180.0, 25.0),
            ],
            &[
                Phase::new("ramp", PhaseKind::Heating, 0.0, 60.0),
                Phase::new("hold", PhaseKind::Reflow, 60.0, 120.0),
                Phase::new("cool", PhaseKind::Cooling, 120.0, 180.0),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_interpolate_reference_points() {
        let profile = plateau();
        assert_eq!(profile.interpolate(30.0), 87.5);
        assert_eq!(profile.interpolate(90.0), 150.0);
        assert_eq!(profile.interpolate(200.0), 25.0);
    }

    #[test]
    fn test_interpolate_exact_at_points() {
        let profile = plateau();
        for point in profile.points() {
            assert_eq!(profile.interpolate(point.elapsed_s), point.target_c);
        }
    }

    #[test]
    fn test_interpolate_clamps_before_start() {
        let profile = plateau();
        assert_eq!(profile.interpolate(-5.0), 25.0);
        assert_eq!(profile.interpolate(f32::NAN), 25.0);
        assert_eq!(profile.interpolate(f32::NEG_INFINITY), 25.0);
    }

    #[test]
    fn test_interpolate_holds_last_target_after_end() {
        let profile = Profile::new(
            "climb",
            &[ProfilePoint::new(0.0, 25.0), ProfilePoint::new(90.0, 180.0)],
            &[],
            None,
        )
        .unwrap();
        assert_eq!(profile.interpolate(90.0), 180.0);
        assert_eq!(profile.interpolate(91.0), 180.0);
        assert_eq!(profile.interpolate(1.0e9), 180.0);
        assert_eq!(profile.interpolate(f32::INFINITY), 180.0);
    }

    #[test]
    fn test_phase_lookup() {
        let profile = plateau();
        assert_eq!(profile.phase_at(0.0).name.as_str(), "ramp");
        assert_eq!(profile.phase_at(59.9).name.as_str(), "ramp");
        assert_eq!(profile.phase_at(60.0).name.as_str(), "hold");
        assert_eq!(profile.phase_at(180.0).name.as_str(), "cool");
        assert_eq!(profile.phase_at(500.0).name.as_str(), "cool");
        assert_eq!(profile.phase_index_at(-1.0), 0);
    }

    #[test]
    fn test_missing_phases_synthesized() {
        let profile = Profile::new(
            "bare",
            &[ProfilePoint::new(0.0, 20.0), ProfilePoint::new(10.0, 40.0)],
            &[],
            None,
        )
        .unwrap();
        assert_eq!(profile.phases().len(), 1);
        assert_eq!(profile.phases()[0].end_s, 10.0);
    }

    #[test]
    fn test_single_point_profile() {
        let profile = Profile::new("hold", &[ProfilePoint::new(0.0, 50.0)], &[], None).unwrap();
        assert_eq!(profile.duration_s(), 0.0);
        assert_eq!(profile.interpolate(100.0), 50.0);
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Profile::new("x", &[], &[], None), Err(ProfileError::Empty));
    }

    #[test]
    fn test_rejects_first_point_offset() {
        let result = Profile::new("x", &[ProfilePoint::new(5.0, 20.0)], &[], None);
        assert_eq!(result, Err(ProfileError::FirstPointNotAtZero));
    }

    #[test]
    fn test_rejects_non_increasing() {
        let result = Profile::new(
            "x",
            &[
                ProfilePoint::new(0.0, 20.0),
                ProfilePoint::new(10.0, 30.0),
                ProfilePoint::new(10.0, 40.0),
            ],
            &[],
            None,
        );
        assert_eq!(result, Err(ProfileError::NotIncreasing));
    }

    #[test]
    fn test_rejects_phase_gap() {
        let result = Profile::new(
            "x",
            &[ProfilePoint::new(0.0, 20.0), ProfilePoint::new(100.0, 200.0)],
            &[
                Phase::new("a", PhaseKind::Heating, 0.0, 40.0),
                Phase::new("b", PhaseKind::Reflow, 50.0, 100.0),
            ],
            None,
        );
        assert_eq!(result, Err(ProfileError::PhasesNotContiguous));
    }

    #[test]
    fn test_rejects_phases_short_of_end() {
        let result = Profile::new(
            "x",
            &[ProfilePoint::new(0.0, 20.0), ProfilePoint::new(100.0, 200.0)],
            &[Phase::new("a", PhaseKind::Heating, 0.0, 90.0)],
            None,
        );
        assert_eq!(result, Err(ProfileError::PhasesNotContiguous));
    }

    #[test]
    fn test_rejects_nan_target() {
        let result = Profile::new(
            "x",
            &[ProfilePoint::new(0.0, 20.0), ProfilePoint::new(10.0, f32::NAN)],
            &[],
            None,
        );
        assert_eq!(result, Err(ProfileError::NonFinite));
    }

    #[test]
    fn test_check_against_ceiling() {
        let profile = plateau();
        assert_eq!(profile.check_against(260.0), Ok(()));
        assert_eq!(profile.check_against(150.0), Err(ProfileError::ExceedsCeiling));
    }
}
