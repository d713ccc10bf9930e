//! Prompt construction for study material generation

/// Builds topic-focused generation prompts
pub struct PromptBuilder {
    topic: String,
    preview_chars: usize,
}

impl PromptBuilder {
    /// Create a builder for `topic`, embedding at most `preview_chars` of chunk source content
    pub fn new(topic: impl Into<String>, preview_chars: usize) -> Self {
        Self {
            topic: topic.into().trim().to_string(),
            preview_chars,
        }
    }

    /// Prompt asking for a JSON array of learning chunks
    pub fn learning_chunks(&self, content: &str) -> String {
        let preview: String = content.chars().take(self.preview_chars).collect();

        let mut prompt = String::new();
        prompt.push_str(&format!(
            "You are an expert educator writing thorough study material about \"{}\".\n\n",
            self.topic
        ));

        prompt.push_str("Source content:\n---\n");
        prompt.push_str(&preview);
        prompt.push_str("\n---\n\n");

        prompt.push_str(CHUNK_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(JSON_ARRAY_RULES);
        prompt.push_str("\n\n");
        prompt.push_str(CHUNK_FORMAT);

        prompt
    }

    /// Prompt asking for a `{"questions": [...]}` object
    pub fn quiz(&self, content: &str, question_count: usize) -> String {
        let mut prompt = String::new();
        prompt.push_str(&format!(
            "Write {} quiz questions that test knowledge of \"{}\" specifically.\n\n",
            question_count, self.topic
        ));

        prompt.push_str("Content (use only the parts about the topic):\n---\n");
        prompt.push_str(content);
        prompt.push_str("\n---\n\n");

        prompt.push_str(TOPIC_FOCUS_RULES);
        prompt.push_str("\n\n");
        prompt.push_str(QUIZ_FORMAT);

        prompt
    }

    /// Prompt asking for a `{"flashcards": [...]}` object
    pub fn flashcards(&self, content: &str, card_count: usize) -> String {
        let mut prompt = String::new();
        prompt.push_str(&format!(
            "Create {} flashcards about \"{}\" specifically.\n\n",
            card_count, self.topic
        ));

        prompt.push_str("Content (use only the parts about the topic):\n---\n");
        prompt.push_str(content);
        prompt.push_str("\n---\n\n");

        prompt.push_str(TOPIC_FOCUS_RULES);
        prompt.push_str("\n\n");
        prompt.push_str(FLASHCARD_FORMAT);

        prompt
    }
}

/// Prompt asking for an easier-to-read HTML rendition of `content`
pub fn simplify_prompt(content: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(SIMPLIFY_INSTRUCTIONS);
    prompt.push_str("\n\nContent to simplify:\n---\n");
    prompt.push_str(content);
    prompt.push_str("\n---\n\nReturn only clean HTML: no markdown, no code fences, no commentary.");
    prompt
}

/// Prompt answering a learner's question against the study context
pub fn chat_prompt(message: &str, context: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a tutor answering questions about the learner's study material.\n\n");

    if !context.trim().is_empty() {
        prompt.push_str("Learning context:\n---\n");
        prompt.push_str(context);
        prompt.push_str("\n---\n\n");
    }

    prompt.push_str("Question:\n");
    prompt.push_str(message);
    prompt.push_str("\n\n");
    prompt.push_str(CHAT_RULES);
    prompt
}

const CHUNK_INSTRUCTIONS: &str = r#"Requirements:
1. Write 5-6 sections that together cover the topic; no more.
2. Keep each section under 200 words.
3. Include concrete examples, syntax, formulas or comparisons taken from the source.
4. Start each section with <h3>Title</h3>, use <p>, <strong>, <em>, <ul><li> and <code>.
5. Correct or complete the source from your own knowledge where it is wrong or thin."#;

const JSON_ARRAY_RULES: &str = r#"JSON rules:
- Escape every double quote inside a string as \" and every backslash as \\
- Use <br> instead of raw newlines inside strings
- Close the array with ]
- Write nothing before [ or after ]"#;

const CHUNK_FORMAT: &str = r#"Return only a JSON array, for example:
[{"id":1,"title":"Title","content":"<h3>Title</h3><p>Body</p>","estimated_time":"6min"},{"id":2,"title":"Next","content":"<h3>Next</h3><p>More</p>","estimated_time":"7min"}]"#;

const TOPIC_FOCUS_RULES: &str = r#"Rules:
- Ask only about technical concepts, operations, syntax and properties of the topic
- Never ask about what the document covers, its introduction or its structure
- Never write "according to the material" or similar"#;

const QUIZ_FORMAT: &str = r#"Question types: multiple_choice (correct is the option index), fill_blank (correct is the missing term), true_false (correct is "true" or "false").

Return only valid JSON:
{"questions":[
  {"type":"multiple_choice","question":"...","options":["A","B","C","D"],"correct":2,"explanation":"..."},
  {"type":"fill_blank","question":"The _____ clause filters rows.","correct":"WHERE","explanation":"..."},
  {"type":"true_false","question":"...","correct":"true","explanation":"..."}
]}"#;

const FLASHCARD_FORMAT: &str = r#"Return only valid JSON:
{"flashcards":[
  {"front":"Term or question","back":"Answer with an example"},
  {"front":"X vs Y","back":"X is used for..., Y for..."}
]}"#;

const SIMPLIFY_INSTRUCTIONS: &str = r#"Rewrite the content below so it is easier to understand without losing detail.
- Keep every technical fact, example, command and term
- Shorten sentences and paragraphs; add analogies next to the technical text
- Format with <h3>, <p>, <strong>, <em>, <code> and <ul><li>"#;

const CHAT_RULES: &str = r#"Answer directly first, then explain with technical depth and a concrete example where useful. Keep it concise."#;
