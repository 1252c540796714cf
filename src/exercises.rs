//! Exercise definitions - built-in lift catalog

/// Muscle groups tracked for recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Core,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
}

impl MuscleGroup {
    /// Name as stored in the `target_muscle` column
    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Forearms => "forearms",
            MuscleGroup::Core => "core",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Calves => "calves",
        }
    }

    /// All muscle groups for iteration (the known-muscle catalog)
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Forearms,
            MuscleGroup::Core,
            MuscleGroup::Quads,
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::Calves,
        ]
    }

    /// Case-insensitive lookup by stored name
    pub fn from_name(name: &str) -> Option<MuscleGroup> {
        Self::all().iter().copied().find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone)]
pub struct Exercise {
    pub name: &'static str,
    /// Primary mover; recovery is tracked against this group
    pub target: MuscleGroup,
}

/// Exercises seeded into a fresh database
pub const EXERCISES: &[Exercise] = &[
    Exercise { name: "bench press", target: MuscleGroup::Chest },
    Exercise { name: "incline dumbbell press", target: MuscleGroup::Chest },
    Exercise { name: "overhead press", target: MuscleGroup::Shoulders },
    Exercise { name: "lateral raise", target: MuscleGroup::Shoulders },
    Exercise { name: "triceps pushdown", target: MuscleGroup::Triceps },
    Exercise { name: "dips", target: MuscleGroup::Triceps },
    Exercise { name: "pull-up", target: MuscleGroup::Back },
    Exercise { name: "barbell row", target: MuscleGroup::Back },
    Exercise { name: "biceps curl", target: MuscleGroup::Biceps },
    Exercise { name: "hammer curl", target: MuscleGroup::Forearms },
    Exercise { name: "squat", target: MuscleGroup::Quads },
    Exercise { name: "leg press", target: MuscleGroup::Quads },
    Exercise { name: "romanian deadlift", target: MuscleGroup::Hamstrings },
    Exercise { name: "hip thrust", target: MuscleGroup::Glutes },
    Exercise { name: "calf raise", target: MuscleGroup::Calves },
    Exercise { name: "hanging leg raise", target: MuscleGroup::Core },
];

pub fn get_all_exercises() -> &'static [Exercise] {
    EXERCISES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muscle_from_name_case_insensitive() {
        assert_eq!(MuscleGroup::from_name("Chest"), Some(MuscleGroup::Chest));
        assert_eq!(MuscleGroup::from_name(" quads "), Some(MuscleGroup::Quads));
        assert_eq!(MuscleGroup::from_name("neck"), None);
    }

    #[test]
    fn test_every_muscle_has_an_exercise() {
        for muscle in MuscleGroup::all() {
            assert!(
                get_all_exercises().iter().any(|e| e.target == *muscle),
                "No exercise targets {}",
                muscle.name()
            );
        }
    }
}
