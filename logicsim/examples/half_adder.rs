//! Example: build a half adder through the registry and flip its switches.
//! Run with: cargo run --example half_adder

use logicsim::prelude::*;

fn main() -> Result<(), LogicSimError> {
    let mut registry = CircuitRegistry::default();
    registry.create_circuit("half adder");

    let a = registry.add_switch(0, 0)?;
    let b = registry.add_switch(0, 40)?;
    let carry_and = registry.add_gate(GateKind::And, 60, 0)?;
    let either = registry.add_gate(GateKind::Or, 60, 40)?;
    let not_both = registry.add_gate(GateKind::Not, 120, 0)?;
    let sum_and = registry.add_gate(GateKind::And, 180, 40)?;
    let sum = registry.add_led(240, 40)?;
    let carry = registry.add_led(240, 0)?;

    registry.add_connector(a, carry_and, 0, "black")?;
    registry.add_connector(b, carry_and, 1, "black")?;
    registry.add_connector(a, either, 0, "black")?;
    registry.add_connector(b, either, 1, "black")?;
    registry.add_connector(carry_and, not_both, 0, "black")?;
    registry.add_connector(either, sum_and, 0, "black")?;
    registry.add_connector(not_both, sum_and, 1, "black")?;
    registry.add_connector(sum_and, sum, 0, "green")?;
    registry.add_connector(carry_and, carry, 0, "red")?;

    println!(" a  b | sum carry");
    for (on_a, on_b) in [(false, false), (false, true), (true, false), (true, true)] {
        registry.set_switch(a, on_a)?;
        let report = registry.set_switch(b, on_b)?;

        let lit = |id| {
            registry
                .find_led(id)
                .and_then(|led| led.state())
                .unwrap_or(false)
        };
        println!(
            " {}  {} |  {}    {}   ({} rounds)",
            on_a as u8,
            on_b as u8,
            lit(sum) as u8,
            lit(carry) as u8,
            report.rounds
        );
    }

    Ok(())
}
