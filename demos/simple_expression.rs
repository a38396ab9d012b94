use log::debug;
use scalc_macros::scalc_fn;
use scalc_rs::{BigDecimal, CalcError, CalculationOptions, CalculatorBuilder, RoundingMode};

/// `percent(value, percentage)`
#[scalc_fn]
fn percent(options: &CalculationOptions, value: BigDecimal, percentage: BigDecimal) -> Result<BigDecimal, CalcError> {
    options
        .calculation()
        .divide(&(value * percentage), &BigDecimal::from(100))
}

fn main() -> Result<(), CalcError> {
    pretty_env_logger::init();

    let mut calculator = CalculatorBuilder::<f64>::new()
        .expression("a + b * √(16)")
        .result_scale(1, RoundingMode::HalfUp)
        .build();
    calculator.parameter("a", 10)?.parameter("b", 2)?;
    println!("a + b * √(16) = {}", calculator.calc()?);

    let mut calculator = CalculatorBuilder::<BigDecimal>::new()
        .expression("round(percent(price, vat), 2, HALF_EVEN)")
        .register_function("percent", percent)?
        .debug_sink(|line| debug!("[trace] {}", line))
        .build();
    calculator.parameter("price", 19.99)?.parameter("vat", 19)?;
    println!("VAT on 19.99 = {}", calculator.calc()?);

    match CalculatorBuilder::<f64>::new().expression("1 / (2 - 2)").build_and_calc() {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {} ({:?})", err.root_cause(), err.kind()),
    }

    Ok(())
}
