//! Starter questions offered before the first search.

const FUTURE: &[&str] = &[
    "How might artificial intelligence reshape daily life in the next 20 years?",
    "What are the biggest hurdles to becoming a multi-planetary species?",
    "Could genetic editing eliminate major diseases, and what are the ethical risks?",
    "What will sustainable cities look like in 2050?",
    "What breakthroughs are needed for truly clean and abundant energy?",
    "How will virtual and augmented reality change human interaction and work?",
];

const PAST: &[&str] = &[
    "What can lost civilizations teach us about societal success and failure?",
    "How did ancient trade routes like the Silk Road shape global culture?",
    "What pivotal moment in history is most misunderstood or underestimated?",
    "How has the concept of 'democracy' evolved across different eras and cultures?",
    "What scientific or technological knowledge from the past was lost and later rediscovered?",
    "How did major artistic movements reflect the societal changes of their time?",
];

const HUMAN: &[&str] = &[
    "What is consciousness, and can it emerge in non-biological systems?",
    "How do cognitive biases influence our decisions and perception of reality?",
    "What does modern science suggest about the nature vs. nurture debate?",
    "Are humans fundamentally cooperative or competitive?",
    "How do different cultures approach concepts like happiness or a meaningful life?",
    "What is the psychological impact of living in an increasingly digital world?",
];

/// One themed pile of questions; shows a single question at a time.
#[derive(Debug, Clone)]
pub struct StarterDeck {
    pub title: &'static str,
    questions: &'static [&'static str],
    current: usize,
}

impl StarterDeck {
    fn new(title: &'static str, questions: &'static [&'static str], current: usize) -> Self {
        Self {
            title,
            questions,
            current: current % questions.len().max(1),
        }
    }

    /// The question currently face up.
    pub fn question(&self) -> &'static str {
        self.questions.get(self.current).copied().unwrap_or_default()
    }

    /// Takes the face-up question and turns over the next one.
    pub fn draw(&mut self) -> &'static str {
        let question = self.question();
        if !self.questions.is_empty() {
            self.current = (self.current + 1) % self.questions.len();
        }
        question
    }
}

/// The three decks, each starting at a different question per `seed`.
pub fn decks(seed: usize) -> Vec<StarterDeck> {
    vec![
        StarterDeck::new("The Future Unveiled", FUTURE, seed),
        StarterDeck::new("Echoes of the Past", PAST, seed / 2 + 1),
        StarterDeck::new("The Human Enigma", HUMAN, seed / 3 + 2),
    ]
}
