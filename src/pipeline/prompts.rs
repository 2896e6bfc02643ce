//! Prompt templates for grounded question answering

/// Sentinel the generator must emit when the context cannot answer
pub const UNANSWERABLE: &str = "UNANSWERABLE";

/// Delimiter between context snippets
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// System instruction for the question-answering generator
pub const QUESTION_ANSWERING_SYSTEM_PROMPT: &str = "\
You are an expert \"Question-Answering\" system.
You receive a question and a context, and need to extract an answer from the context.

RULES
- You must set 'answer_text' to 'UNANSWERABLE' if the question cannot be answered from the context.
- If the question can be answered, provide the best possible answer in 'answer_text'.
- If the question can be answered, provide one or more verbatim source quotes from the context \
that justify the answer.

OUTPUT FORMAT
- Output format should be a JSON in the following format:
{
    'answer_text': '...',
    'answer_sources': ['...', '...']
}
";

/// Build the user prompt from a question and assembled context
pub fn question_answering_user_prompt(question: &str, context: &str) -> String {
    format!("QUESTION\n{}\n\nCONTEXT\n{}\n", question, context)
}
