use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::circuit::{Circuit, Net};
use crate::error::{FloorplanError, Result};
use crate::geometry::Size;

/// Whitespace-separated tokens tagged with their 1-based line number.
struct Tokens<'a> {
    inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let inner = text
            .lines()
            .enumerate()
            .flat_map(|(idx, line)| line.split_whitespace().map(move |tok| (idx + 1, tok)));
        Self {
            inner: Box::new(inner),
            line: 1,
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str> {
        match self.inner.next() {
            Some((line, token)) => {
                self.line = line;
                Ok(token)
            }
            None => Err(self.error(format!("unexpected end of input, expected {what}"))),
        }
    }

    fn keyword(&mut self, keyword: &str) -> Result<()> {
        let token = self.next(keyword)?;
        if token == keyword {
            Ok(())
        } else {
            Err(self.error(format!("expected `{keyword}`, found `{token}`")))
        }
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| self.error(format!("invalid {what} `{token}`")))
    }

    fn error(&self, message: String) -> FloorplanError {
        FloorplanError::Parse {
            line: self.line,
            message,
        }
    }
}

/// Parse a `.block` file:
///
/// ```text
/// Outline: 100 80
/// NumBlocks: 2
/// NumTerminals: 1
/// a 40 30
/// b 20 50
/// VSS terminal 0 40
/// ```
pub fn parse_blocks(text: &str) -> Result<Circuit> {
    let mut tokens = Tokens::new(text);

    tokens.keyword("Outline:")?;
    let width = tokens.number("outline width")?;
    let height = tokens.number("outline height")?;
    tokens.keyword("NumBlocks:")?;
    let block_count: usize = tokens.number("block count")?;
    tokens.keyword("NumTerminals:")?;
    let terminal_count: usize = tokens.number("terminal count")?;

    let mut circuit = Circuit::new(Size::new(width, height));
    for _ in 0..block_count {
        let name = tokens.next("block name")?;
        if circuit.pin(name).is_some() {
            return Err(tokens.error(format!("duplicate name `{name}`")));
        }
        let w = tokens.number("block width")?;
        let h = tokens.number("block height")?;
        if w == 0 || h == 0 {
            return Err(tokens.error(format!("block `{name}` has a zero dimension")));
        }
        circuit.add_block(name, w, h);
    }
    for _ in 0..terminal_count {
        let name = tokens.next("terminal name")?;
        if circuit.pin(name).is_some() {
            return Err(tokens.error(format!("duplicate name `{name}`")));
        }
        tokens.keyword("terminal")?;
        let x = tokens.number("terminal x")?;
        let y = tokens.number("terminal y")?;
        circuit.add_terminal(name, x, y);
    }

    if let Ok(extra) = tokens.next("end of input") {
        return Err(tokens.error(format!("unexpected trailing token `{extra}`")));
    }
    Ok(circuit)
}

/// Parse a `.nets` file into `circuit`, resolving pin names against the
/// blocks and terminals it already holds.
pub fn parse_nets(text: &str, circuit: &mut Circuit) -> Result<()> {
    let mut tokens = Tokens::new(text);

    tokens.keyword("NumNets:")?;
    let net_count: usize = tokens.number("net count")?;
    let mut nets = Vec::with_capacity(net_count);
    for _ in 0..net_count {
        tokens.keyword("NetDegree:")?;
        let degree: usize = tokens.number("net degree")?;
        let mut pins = Vec::with_capacity(degree);
        for _ in 0..degree {
            let name = tokens.next("pin name")?;
            let pin = circuit
                .pin(name)
                .ok_or_else(|| FloorplanError::UnknownPin(name.to_string()))?;
            pins.push(pin);
        }
        nets.push(Net::new(pins));
    }

    for net in nets {
        circuit.add_net(net);
    }
    Ok(())
}

pub fn load_circuit(block_path: impl AsRef<Path>, net_path: impl AsRef<Path>) -> Result<Circuit> {
    let mut circuit = parse_blocks(&fs::read_to_string(block_path)?)?;
    parse_nets(&fs::read_to_string(net_path)?, &mut circuit)?;
    Ok(circuit)
}
