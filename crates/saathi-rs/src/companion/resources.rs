//! Static self-help content.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceSection {
    pub heading: &'static str,
    pub exercises: &'static [Exercise],
}

pub const CBT_EXERCISES: [Exercise; 3] = [
    Exercise {
        title: "What is Thought Challenging?",
        body: "Thought challenging is a technique to identify and question negative or \
irrational thoughts. When you notice a distressing thought, ask yourself: Is this thought \
100% true? What's a more balanced perspective? This helps reduce the power of negative \
thinking patterns.",
    },
    Exercise {
        title: "The 3 C's Technique",
        body: "When you're feeling down, try the 3 C's:\n\
1. Catch the negative thought.\n\
2. Check the thought for facts vs. feelings.\n\
3. Change the thought to a more realistic or helpful one.",
    },
    Exercise {
        title: "Activity Scheduling",
        body: "When feeling low or unmotivated, it can be helpful to schedule positive \
activities into your day, no matter how small. This could be a 10-minute walk, listening \
to a favorite song, or calling a friend. It helps break the cycle of inactivity and low mood.",
    },
];

pub const MINDFULNESS_PRACTICES: [Exercise; 3] = [
    Exercise {
        title: "5-4-3-2-1 Grounding",
        body: "When feeling overwhelmed, bring yourself to the present moment. Acknowledge:\n\
- 5 things you can see.\n\
- 4 things you can touch.\n\
- 3 things you can hear.\n\
- 2 things you can smell.\n\
- 1 thing you can taste.",
    },
    Exercise {
        title: "Mindful Breathing",
        body: "Sit comfortably and close your eyes. Focus on your breath, noticing the \
sensation of air entering and leaving your body. If your mind wanders, gently guide your \
attention back to your breath. Do this for just 2-3 minutes to start.",
    },
    Exercise {
        title: "Body Scan Meditation",
        body: "Lie down comfortably and bring your attention to your toes. Notice any \
sensations without judgment. Slowly move your attention up through your feet, legs, torso, \
arms, and head. This practice helps cultivate awareness and release physical tension.",
    },
];

pub const SECTIONS: [ResourceSection; 2] = [
    ResourceSection {
        heading: "Cognitive Behavioral Therapy (CBT) Exercises",
        exercises: &CBT_EXERCISES,
    },
    ResourceSection {
        heading: "Mindfulness Practices",
        exercises: &MINDFULNESS_PRACTICES,
    },
];
