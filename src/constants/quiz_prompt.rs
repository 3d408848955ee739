pub const MCQ_SYSTEM_PROMPT: &str = "You are a helpful AI that is able to generate multiple choice questions and answers. The length of each answer and each option should not be more than 15 words.";

pub const OPEN_ENDED_SYSTEM_PROMPT: &str = "You are a helpful AI that is able to generate pairs of questions and answers. The length of each answer should not be more than 15 words and should not be less than 3 words.";

pub const MCQ_OUTPUT_FORMAT: &str = r#"[{"question": "question", "answer": "answer", "option1": "option1", "option2": "option2", "option3": "option3"}]"#;

pub const OPEN_ENDED_OUTPUT_FORMAT: &str = r#"[{"question": "question", "answer": "answer"}]"#;

pub const OUTPUT_INSTRUCTIONS: &str = "Return only the JSON array. Do not escape the double quotes in the output and do not wrap it in Markdown. The JSON array is:";
