use scalc_rs::batch::calc_batch_with;
use scalc_rs::{BigDecimal, CalculatorBuilder, ParameterBag};

fn main() {
    pretty_env_logger::init();

    let bags: Vec<ParameterBag> = [(120, 3000), (80, 6000), (0, 10)]
        .into_iter()
        .map(|(price, volume)| {
            ParameterBag::from([
                ("price".to_string(), Some(BigDecimal::from(price))),
                ("volume".to_string(), Some(BigDecimal::from(volume))),
            ])
        })
        .collect();

    let calculator = CalculatorBuilder::<f64>::new()
        .expression("volume / price")
        .build();

    for (i, result) in calc_batch_with(&calculator, &bags).into_iter().enumerate() {
        match result {
            Ok(value) => println!("Result {}: {}", i, value),
            Err(err) => println!("Result {}: {}", i, err.root_cause()),
        }
    }
}
