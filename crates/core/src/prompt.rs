const SYSTEM_WITH_CONTEXT: &str =
    "You are a helpful assistant. Use the following PDF context if relevant.";
const SYSTEM_WITHOUT_CONTEXT: &str = "You are a helpful assistant. Answer the question below.";

pub fn build_prompt(question: &str, context: &[String]) -> String {
    if context.is_empty() {
        format!("{SYSTEM_WITHOUT_CONTEXT}\n\nUser Question: {question}")
    } else {
        let joined = context.join("\n\n");
        format!("{SYSTEM_WITH_CONTEXT}\n\nPDF Context:\n{joined}\n\nUser Question: {question}")
    }
}
