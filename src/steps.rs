//! Step registry
//!
//! The ordered, immutable list of tutorial steps plus the small queries the
//! surrounding UI needs (progress, phase badges, step indicators). Content is
//! injectable as JSON; the number of steps is fixed because the scene composer
//! has one branch per step.

use serde::{Deserialize, Serialize};

use crate::consts::{CRACK_STEP, SPLIT_STEP, STEP_COUNT};
use crate::error::{RegistryError, StepError};

/// A validated step index in `1..=STEP_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Step(u8);

impl Step {
    pub const FIRST: Step = Step(1);
    pub const LAST: Step = Step(STEP_COUNT);

    /// Validate a raw step number
    pub fn new(n: i64) -> Result<Self, StepError> {
        if (1..=i64::from(STEP_COUNT)).contains(&n) {
            Ok(Step(n as u8))
        } else {
            Err(StepError::out_of_range(n))
        }
    }

    /// Nearest valid step
    pub fn clamped(n: i64) -> Self {
        Step(n.clamp(1, i64::from(STEP_COUNT)) as u8)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Following step, `None` at the last one
    pub fn next(self) -> Option<Step> {
        (self.0 < STEP_COUNT).then(|| Step(self.0 + 1))
    }

    /// Preceding step, `None` at the first one
    pub fn previous(self) -> Option<Step> {
        (self.0 > 1).then(|| Step(self.0 - 1))
    }

    /// All steps in order
    pub fn all() -> impl Iterator<Item = Step> {
        (1..=STEP_COUNT).map(Step)
    }

    /// Coconut is drawn as two halves (crack and split steps)
    pub fn is_cracked(self) -> bool {
        self.0 >= CRACK_STEP
    }

    pub fn is_split(self) -> bool {
        self.0 == SPLIT_STEP
    }

    /// Progress through the tutorial, rounded to a whole percent
    pub fn progress_percent(self) -> u8 {
        (f32::from(self.0) / f32::from(STEP_COUNT) * 100.0).round() as u8
    }

    pub fn phase(self) -> ProcessPhase {
        if self.0 <= 5 {
            ProcessPhase::WaterExtraction
        } else {
            ProcessPhase::ShellCracking
        }
    }

    /// Water is visibly spilling (crack and split steps)
    pub fn shows_spill_notice(self) -> bool {
        self.is_cracked()
    }

    pub fn is_complete(self) -> bool {
        self == Step::LAST
    }

    /// Status of the indicator for `other` while `self` is current
    pub fn status_of(self, other: Step) -> StepStatus {
        match other.cmp(&self) {
            std::cmp::Ordering::Less => StepStatus::Done,
            std::cmp::Ordering::Equal => StepStatus::Current,
            std::cmp::Ordering::Greater => StepStatus::Pending,
        }
    }
}

impl TryFrom<u8> for Step {
    type Error = StepError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Step::new(i64::from(value))
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.0
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse phase badge shown next to the step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessPhase {
    WaterExtraction,
    ShellCracking,
}

impl ProcessPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessPhase::WaterExtraction => "Water Extraction",
            ProcessPhase::ShellCracking => "Shell Cracking",
        }
    }
}

/// Step indicator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Done,
    Current,
    Pending,
}

/// Text content for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub id: u8,
    pub title: String,
    pub description: String,
    pub instruction: String,
}

const DEFAULT_STEPS: [(&str, &str, &str); STEP_COUNT as usize] = [
    (
        "Select Fresh Coconut",
        "Choose a fresh coconut by shaking it to hear the water inside",
        "Look for a coconut that feels heavy and sounds full of water when shaken",
    ),
    (
        "Locate the Eyes",
        "Find the three 'eyes' at the top of the coconut",
        "The eyes are the three dark spots that form a triangle pattern",
    ),
    (
        "Pierce the Softest Eye",
        "Use a sharp tool to pierce through the softest eye",
        "Test each eye with gentle pressure to find the softest one",
    ),
    (
        "Create Drainage Hole",
        "Make a hole large enough for water to flow out",
        "Twist and push the tool to create a clean hole",
    ),
    (
        "Extract Coconut Water",
        "Turn the coconut upside down and let the water drain",
        "Hold over a glass and let gravity do the work",
    ),
    (
        "Find the Seam",
        "Locate the natural seam that runs around the coconut's equator",
        "Look for the line that divides the coconut into two halves",
    ),
    (
        "Crack the Coconut",
        "Strike along the seam with a heavy knife or hammer",
        "Rotate and tap firmly along the seam until it cracks",
    ),
    (
        "Split Open",
        "Separate the two halves to reveal the coconut meat",
        "Twist and pull apart the cracked halves - water will spill out!",
    ),
];

/// Ordered step content
///
/// Serialized as a bare array of descriptors; deserializing goes through
/// [`StepRegistry::new`], so the count and ids are always checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StepDescriptor>", into = "Vec<StepDescriptor>")]
pub struct StepRegistry {
    steps: Vec<StepDescriptor>,
}

impl Default for StepRegistry {
    fn default() -> Self {
        let steps = DEFAULT_STEPS
            .iter()
            .enumerate()
            .map(|(i, (title, description, instruction))| StepDescriptor {
                id: i as u8 + 1,
                title: (*title).to_string(),
                description: (*description).to_string(),
                instruction: (*instruction).to_string(),
            })
            .collect();
        Self { steps }
    }
}

impl TryFrom<Vec<StepDescriptor>> for StepRegistry {
    type Error = RegistryError;

    fn try_from(steps: Vec<StepDescriptor>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

impl From<StepRegistry> for Vec<StepDescriptor> {
    fn from(registry: StepRegistry) -> Self {
        registry.steps
    }
}

impl StepRegistry {
    /// Build a registry from injected content, checking count and ids
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self, RegistryError> {
        if steps.len() != STEP_COUNT as usize {
            return Err(RegistryError::WrongLength {
                expected: STEP_COUNT as usize,
                found: steps.len(),
            });
        }
        if let Some((position, step)) = steps
            .iter()
            .enumerate()
            .find(|(i, s)| usize::from(s.id) != i + 1)
        {
            return Err(RegistryError::IdMismatch {
                position,
                id: step.id,
            });
        }
        Ok(Self { steps })
    }

    /// Parse a JSON array of step descriptors
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let steps: Vec<StepDescriptor> = serde_json::from_str(json)?;
        Self::new(steps)
    }

    /// Descriptor for a 1-based index, `None` outside the valid range
    pub fn get(&self, index: usize) -> Option<&StepDescriptor> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// Descriptor for a validated step
    pub fn descriptor(&self, step: Step) -> &StepDescriptor {
        &self.steps[usize::from(step.get()) - 1]
    }

    /// Floating caption, e.g. "Step 3: Pierce the Softest Eye"
    pub fn caption(&self, step: Step) -> String {
        format!("Step {}: {}", step, self.descriptor(step).title)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.iter()
    }
}
