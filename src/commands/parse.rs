use super::read_source;

pub fn parse(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let program = espresso_core::parse(&source)?;
    println!("{}", program);
    Ok(())
}
