//! The built-in quiz catalog.

use crate::{Question, Quiz, QuizSummary};

/// The question bank: an ordered set of quizzes keyed by difficulty.
///
/// Lookup only — unknown keys are reported as `None` and mapped to an
/// error by the caller.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    quizzes: Vec<Quiz>,
}

impl QuestionBank {
    /// Builds a bank from an explicit quiz list. Catalog order follows
    /// insertion order.
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self { quizzes }
    }

    /// The built-in aptitude catalog: easy, medium, and hard quizzes with
    /// eight questions each.
    pub fn builtin() -> Self {
        Self::new(vec![easy(), medium(), hard()])
    }

    /// Looks up the quiz for a difficulty key.
    pub fn get(&self, difficulty: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.difficulty == difficulty)
    }

    /// Catalog rows for every quiz, in catalog order.
    pub fn catalog(&self) -> Vec<QuizSummary> {
        self.quizzes.iter().map(Quiz::summary).collect()
    }
}

fn question(
    id: u32,
    text: &str,
    options: [&str; 4],
    correct: &str,
    explanation: &str,
    time_limit_secs: u64,
) -> Question {
    Question {
        id,
        text: text.into(),
        options: options.iter().map(|o| (*o).into()).collect(),
        correct_answer: correct.into(),
        explanation: explanation.into(),
        time_limit_secs,
    }
}

fn easy() -> Quiz {
    let t = 30;
    Quiz {
        id: "easy-quiz".into(),
        title: "Basic Aptitude".into(),
        difficulty: "easy".into(),
        description: "Fundamental logical reasoning and basic math".into(),
        time_per_question_secs: t,
        points_per_question: 10,
        questions: vec![
            question(
                1,
                "If A is taller than B, and B is taller than C, then A is taller than C. This is an example of:",
                ["Transitive property", "Commutative property", "Associative property", "Distributive property"],
                "Transitive property",
                "The transitive property states that if A > B and B > C, then A > C.",
                t,
            ),
            question(
                2,
                "What comes next in the sequence: 2, 4, 8, 16, ___?",
                ["20", "24", "32", "28"],
                "32",
                "Each number is multiplied by 2: 2×2=4, 4×2=8, 8×2=16, 16×2=32",
                t,
            ),
            question(
                3,
                "If all roses are flowers and some flowers are red, which statement must be true?",
                ["All roses are red", "Some roses are red", "All red things are flowers", "Cannot be determined"],
                "Cannot be determined",
                "We know roses are flowers, but we don't know if roses are among the flowers that are red.",
                t,
            ),
            question(
                4,
                "A shopkeeper sells 20% more items this month than last month. If he sold 120 items last month, how many did he sell this month?",
                ["140", "144", "150", "160"],
                "144",
                "120 + (20% of 120) = 120 + 24 = 144 items",
                t,
            ),
            question(
                5,
                "Which word does NOT belong with the others?",
                ["Square", "Triangle", "Circle", "Rectangle"],
                "Circle",
                "Circle is the only curved shape; the others are all polygons with straight edges.",
                t,
            ),
            question(
                6,
                "If 3x + 7 = 22, what is the value of x?",
                ["3", "4", "5", "6"],
                "5",
                "3x + 7 = 22, so 3x = 15, therefore x = 5",
                t,
            ),
            question(
                7,
                "Complete the analogy: Book is to Library as Car is to ___?",
                ["Garage", "Highway", "Driver", "Engine"],
                "Garage",
                "A book is stored in a library, just as a car is stored in a garage.",
                t,
            ),
            question(
                8,
                "What is 25% of 80?",
                ["15", "20", "25", "30"],
                "20",
                "25% of 80 = 0.25 × 80 = 20",
                t,
            ),
        ],
    }
}

fn medium() -> Quiz {
    let t = 25;
    Quiz {
        id: "medium-quiz".into(),
        title: "Intermediate Aptitude".into(),
        difficulty: "medium".into(),
        description: "Moderate quantitative and verbal reasoning".into(),
        time_per_question_secs: t,
        points_per_question: 15,
        questions: vec![
            question(
                1,
                "In a class of 30 students, 18 play football and 12 play basketball. If 8 students play both sports, how many play neither?",
                ["6", "8", "10", "12"],
                "8",
                "Total = Football + Basketball - Both + Neither. 30 = 18 + 12 - 8 + Neither, so Neither = 8",
                t,
            ),
            question(
                2,
                "If the ratio of boys to girls in a class is 3:2 and there are 25 students total, how many boys are there?",
                ["10", "12", "15", "18"],
                "15",
                "Let 3x + 2x = 25, so 5x = 25, x = 5. Boys = 3x = 3 × 5 = 15",
                t,
            ),
            question(
                3,
                "A train travels 120 km in 2 hours. If it continues at the same speed, how far will it travel in 5 hours?",
                ["240 km", "300 km", "360 km", "480 km"],
                "300 km",
                "Speed = 120/2 = 60 km/h. Distance in 5 hours = 60 × 5 = 300 km",
                t,
            ),
            question(
                4,
                "What is the next number in the series: 1, 4, 9, 16, 25, ___?",
                ["30", "36", "42", "49"],
                "36",
                "This is the sequence of perfect squares: 1², 2², 3², 4², 5², so the next is 6² = 36",
                t,
            ),
            question(
                5,
                "If 5 workers can build a wall in 8 days, how many days will it take 8 workers to build the same wall?",
                ["4 days", "5 days", "6 days", "8 days"],
                "5 days",
                "Using inverse proportion: 5 × 8 = 8 × x, so 40 = 8x, therefore x = 5 days",
                t,
            ),
            question(
                6,
                "Which of the following is the odd one out?",
                ["Square", "Rectangle", "Rhombus", "Trapezoid"],
                "Trapezoid",
                "Square, Rectangle, and Rhombus are all parallelograms, but Trapezoid has only one pair of parallel sides.",
                t,
            ),
            question(
                7,
                "If a clock shows 3:15, what is the angle between the hour and minute hands?",
                ["0°", "7.5°", "15°", "30°"],
                "7.5°",
                "At 3:15 the minute hand is at 90°, the hour hand at 97.5°. Difference = 7.5°",
                t,
            ),
            question(
                8,
                "A number is increased by 25% and then decreased by 20%. What is the net change?",
                ["No change", "5% increase", "5% decrease", "Cannot be determined"],
                "No change",
                "Let original = 100. After 25% increase: 125. After 20% decrease: 125 × 0.8 = 100. Net change = 0%",
                t,
            ),
        ],
    }
}

fn hard() -> Quiz {
    let t = 20;
    Quiz {
        id: "hard-quiz".into(),
        title: "Advanced Aptitude".into(),
        difficulty: "hard".into(),
        description: "Complex analytical and reasoning skills".into(),
        time_per_question_secs: t,
        points_per_question: 20,
        questions: vec![
            question(
                1,
                "In a group of 100 people, 60 like coffee, 40 like tea, and 20 like both. How many people like neither coffee nor tea?",
                ["20", "25", "30", "35"],
                "20",
                "Neither = Total - (Coffee + Tea - Both) = 100 - (60 + 40 - 20) = 20",
                t,
            ),
            question(
                2,
                "If a car's speed increases from 60 km/h to 90 km/h, what is the percentage increase?",
                ["30%", "40%", "50%", "60%"],
                "50%",
                "Percentage increase = ((90 - 60) / 60) × 100 = 50%",
                t,
            ),
            question(
                3,
                "A cube has a surface area of 150 cm². What is its volume?",
                ["125 cm³", "150 cm³", "175 cm³", "200 cm³"],
                "125 cm³",
                "Surface area = 6a² = 150, so a = 5 cm. Volume = 5³ = 125 cm³",
                t,
            ),
            question(
                4,
                "If 2^x = 8 and 3^y = 27, what is the value of x + y?",
                ["5", "6", "7", "8"],
                "6",
                "2^x = 8 = 2³, so x = 3. 3^y = 27 = 3³, so y = 3. x + y = 6",
                t,
            ),
            question(
                5,
                "A bag contains 5 red, 4 blue, and 3 green balls. If two balls are drawn without replacement, what is the probability of getting one red and one blue ball?",
                ["1/3", "5/18", "1/4", "2/9"],
                "5/18",
                "P = (5/12 × 4/11) + (4/12 × 5/11) = 40/132 ≈ 5/18",
                t,
            ),
            question(
                6,
                "If the compound interest on a sum for 2 years at 10% per annum is ₹210, what is the principal amount?",
                ["₹900", "₹950", "₹1000", "₹1050"],
                "₹1000",
                "CI = P[(1.1)² - 1] = 0.21P. So P = 210/0.21 = ₹1000",
                t,
            ),
            question(
                7,
                "In a triangle ABC, if angle A = 60° and sides b = 8, c = 6, what is the length of side a?",
                ["7", "8", "9", "10"],
                "7",
                "Cosine rule: a² = 64 + 36 - 2(8)(6)cos(60°) = 52, so a ≈ 7",
                t,
            ),
            question(
                8,
                "A man rows 15 km downstream in 3 hours and the same distance upstream in 5 hours. What is the speed of the stream?",
                ["1 km/h", "1.5 km/h", "2 km/h", "2.5 km/h"],
                "1 km/h",
                "Downstream speed = 5 km/h, upstream = 3 km/h. Stream speed = (5 - 3)/2 = 1 km/h",
                t,
            ),
        ],
    }
}
