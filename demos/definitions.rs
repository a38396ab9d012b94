use scalc_rs::{CalcError, CalculatorBuilder, RoundingMode};

fn main() -> Result<(), CalcError> {
    pretty_env_logger::init();

    let expression = "
        f(x, y) = 10 + (x * y) - 1;
        g(x) = sqrt(x);
        variable1 = 7;
        return f(2, 3) + g(4) - variable1;
    ";
    let result = CalculatorBuilder::<f64>::new()
        .expression(expression)
        .result_scale(1, RoundingMode::HalfUp)
        .build_and_calc()?;
    println!("Definition block = {}", result);

    // functions read variables when they are called, not when they are defined
    let mut calculator = CalculatorBuilder::<i64>::new()
        .expression("total(n) = n * rate; rate = base + 1; return total(amount);")
        .build();
    calculator.parameter("base", 2)?.parameter("amount", 5)?;
    println!("Late bound rate = {}", calculator.calc()?);

    Ok(())
}
