use espresso_core::language::token::Token;
use super::read_source;

pub fn format_tokens(tokens: &[Token], json: bool) -> Result<String, Box<dyn std::error::Error>> {
    if json {
        return Ok(serde_json::to_string_pretty(tokens)?);
    }

    Ok(tokens
        .iter()
        .map(|token| format!("{}:{}\t{}", token.position.line, token.position.column, token.summary()))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn tokens(path: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let tokens = espresso_core::tokenize(&source)?;
    println!("{}", format_tokens(&tokens, json)?);
    Ok(())
}
