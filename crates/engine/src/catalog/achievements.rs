//! Achievement catalog

use lootinyang_core::{Achievement, AchievementCondition, BadgeTier};
use std::sync::OnceLock;

static ACHIEVEMENTS: OnceLock<Vec<Achievement>> = OnceLock::new();

/// All unlockable achievements. An achievement's id is its condition tag.
pub fn achievement_catalog() -> &'static [Achievement] {
    ACHIEVEMENTS.get_or_init(build_achievements)
}

fn entry(
    condition: AchievementCondition,
    name: &str,
    description: &str,
    icon: &str,
    points: u32,
    badge: BadgeTier,
) -> Achievement {
    Achievement {
        id: condition.tag().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        condition,
        points,
        badge,
    }
}

fn build_achievements() -> Vec<Achievement> {
    use AchievementCondition::*;

    vec![
        entry(CreateFirstHabit, "First Paw Step", "Create your first habit", "🐾", 10, BadgeTier::Bronze),
        entry(Streak7Days, "Week of Whiskers", "Complete every habit 7 days in a row", "🔥", 30, BadgeTier::Silver),
        entry(Streak30Days, "Cat of Iron Will", "Complete every habit 30 days in a row", "💪", 100, BadgeTier::Gold),
        entry(ThreeWeeksSuccess, "Triple Purr", "Meet your weekly targets 3 weeks in a row", "🎯", 50, BadgeTier::Silver),
        entry(Create5Habits, "Busy Kitten", "Track 5 habits at once", "📋", 20, BadgeTier::Bronze),
        entry(Open10Boxes, "Box Enthusiast", "Open 10 reward boxes", "📦", 40, BadgeTier::Silver),
        entry(ReachLevel50, "Elder Cat", "Reach level 50", "⭐", 150, BadgeTier::Gold),
        entry(PerfectMonth, "Purrfect Month", "Complete every habit for a whole month", "🏆", 200, BadgeTier::Diamond),
    ]
}
