use baccarat::simulation::SimulationResult;
use baccarat::{
    parse_labels, simulate, Label, NextStep, Outcome, Round, Side, SimulationConfig, WeightTable,
};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::info;

pub const HISTORY_LIMIT: usize = 100;
/// Rounds summed for the next-round recommendation.
pub const ROLLING_WINDOW: usize = 6;

const HELP: &str = "\
Enter card labels (0 A 2 3 4 5 6 7 8 9), several per line if you like.
Commands:
  undo     take back the last card
  clear    start the round over
  record   store the finished round in the history and start a new one
  sim      simulate the next round from the remaining shoe
  history  list recorded rounds
  forget   clear the history
  weights  show the weight table
  quit     leave";

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: u64,
    pub player_cards: Vec<Label>,
    pub banker_cards: Vec<Label>,
    pub score: i64,
    pub outcome: Outcome,
    /// Sum of the scores of this round and the 5 before it. None until 6
    /// rounds are recorded.
    pub rolling_sum6: Option<i64>,
    /// Next-round side by the sign of `rolling_sum6`.
    pub recommendation: Option<Side>,
}

/// Finished rounds, newest first.
#[derive(Debug)]
pub struct History {
    records: VecDeque<HistoryRecord>,
    next_id: u64,
}

impl Default for History {
    fn default() -> Self {
        Self {
            records: VecDeque::with_capacity(HISTORY_LIMIT),
            next_id: 1,
        }
    }
}

impl History {
    /// Stores a round if it is valid and complete. The oldest record is
    /// dropped beyond `HISTORY_LIMIT`.
    pub fn record(&mut self, round: &Round, weights: &WeightTable) -> Option<&HistoryRecord> {
        let outcome = round.outcome()?;
        let score = round.score(weights);
        let rolling_sum6 = (self.records.len() + 1 >= ROLLING_WINDOW).then(|| {
            let previous: i64 = self
                .records
                .iter()
                .take(ROLLING_WINDOW - 1)
                .map(|r| r.score)
                .sum();
            previous + score
        });
        let record = HistoryRecord {
            id: self.next_id,
            player_cards: round.get_player_cards().to_vec(),
            banker_cards: round.get_banker_cards().to_vec(),
            score,
            outcome,
            rolling_sum6,
            recommendation: rolling_sum6.map(baccarat::recommend),
        };
        self.next_id += 1;
        self.records.push_front(record);
        self.records.truncate(HISTORY_LIMIT);
        self.records.front()
    }

    pub fn records(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_recommendations(&self, side: Side) -> usize {
        self.records
            .iter()
            .filter(|r| r.recommendation == Some(side))
            .count()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

pub fn format_cards(cards: &[Label]) -> String {
    if cards.is_empty() {
        return String::from("-");
    }
    cards
        .iter()
        .map(|c| c.symbol())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_score(score: i64) -> String {
    if score >= 0 {
        format!("+{}", score)
    } else {
        score.to_string()
    }
}

/// Plain-text result of a round, the way it is shared with others.
pub fn format_summary(round: &Round, weights: &WeightTable) -> String {
    let score = round.score(weights);
    let mut summary = format!(
        "Player cards: {}\nBanker cards: {}\nScore: {}\nRecommendation: {}",
        format_cards(round.get_player_cards()),
        format_cards(round.get_banker_cards()),
        format_score(score),
        baccarat::recommend(score).name(),
    );
    if let Some(outcome) = round.outcome() {
        summary.push_str(&format!("\nWinner: {}", outcome.name()));
    }
    summary
}

pub fn format_rolling(record: &HistoryRecord) -> String {
    match (record.rolling_sum6, record.recommendation) {
        (Some(sum), Some(side)) => format!("sum6 {} next {}", format_score(sum), side.name()),
        _ => String::from("fewer than 6 rounds"),
    }
}

pub fn format_simulation(result: &SimulationResult) -> String {
    format!(
        "Banker: {:.2}%   Player: {:.2}%   Avg score: {:.2}   ({} runs, this round's cards excluded)",
        result.banker_rate * 100.0,
        result.player_rate * 100.0,
        result.avg_score,
        result.runs,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

pub struct Session {
    weights: WeightTable,
    simulation: SimulationConfig,
    round: Round,
    history: History,
}

impl Session {
    pub fn new(weights: WeightTable, simulation: SimulationConfig) -> Self {
        Self {
            weights,
            simulation,
            round: Round::new(),
            history: History::default(),
        }
    }

    pub fn get_history(&self) -> &History {
        &self.history
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<()> {
        writeln!(output, "{}", HELP)?;
        self.write_prompt(output)?;
        for line in input.lines() {
            if self.handle_line(&line?, output)? == Control::Quit {
                break;
            }
            self.write_prompt(output)?;
        }
        Ok(())
    }

    fn handle_line<W: Write>(&mut self, line: &str, output: &mut W) -> io::Result<Control> {
        match line.trim() {
            "" => {}
            "quit" | "exit" => return Ok(Control::Quit),
            "help" => writeln!(output, "{}", HELP)?,
            "undo" => match self.round.undo() {
                Some((side, card)) => {
                    writeln!(output, "Took back {} from {}", card.symbol(), side.name())?
                }
                None => writeln!(output, "Nothing to take back")?,
            },
            "clear" => self.round.clear(),
            "record" => self.record(output)?,
            "sim" => self.simulate(output)?,
            "history" => self.write_history(output)?,
            "forget" => {
                self.history.clear();
                writeln!(output, "History cleared")?;
            }
            "weights" => {
                for (label, weight) in self.weights.iter() {
                    writeln!(output, "  {}: {}", label.symbol(), format_score(weight as i64))?;
                }
            }
            cards => match parse_labels(cards) {
                Ok(cards) => self.deal(&cards, output)?,
                Err(err) => writeln!(output, "{}", err)?,
            },
        }
        Ok(Control::Continue)
    }

    fn deal<W: Write>(&mut self, cards: &[Label], output: &mut W) -> io::Result<()> {
        for &card in cards {
            match self.round.deal(card) {
                Ok(side) => writeln!(output, "{} -> {}", card.symbol(), side.name())?,
                Err(err) => {
                    writeln!(output, "{} refused: {}", card.symbol(), err)?;
                    break;
                }
            }
        }
        Ok(())
    }

    fn record<W: Write>(&mut self, output: &mut W) -> io::Result<()> {
        match self.history.record(&self.round, &self.weights) {
            Some(record) => {
                info!(id = record.id, score = record.score, "round recorded");
                writeln!(output, "Recorded round #{}", record.id)?;
                writeln!(output, "{}", format_rolling(record))?;
                self.round.clear();
            }
            None => writeln!(output, "Only a valid, complete round can be recorded")?,
        }
        Ok(())
    }

    fn simulate<W: Write>(&mut self, output: &mut W) -> io::Result<()> {
        if !self.round.status().is_valid() {
            return writeln!(output, "Finish a valid round before simulating");
        }
        let removed: Vec<Label> = self.round.all_cards().copied().collect();
        match simulate(&self.simulation, &removed, &self.weights) {
            Ok(result) => writeln!(output, "{}", format_simulation(&result)),
            Err(err) => writeln!(output, "Simulation failed: {}", err),
        }
    }

    fn write_history<W: Write>(&self, output: &mut W) -> io::Result<()> {
        if self.history.is_empty() {
            return writeln!(output, "No rounds recorded");
        }
        writeln!(
            output,
            "{} rounds, banker {} / player {}",
            self.history.len(),
            self.history.count_recommendations(Side::Banker),
            self.history.count_recommendations(Side::Player),
        )?;
        for record in self.history.records() {
            writeln!(
                output,
                "#{:<3} P[{}] B[{}] {} winner {}, {}",
                record.id,
                format_cards(&record.player_cards),
                format_cards(&record.banker_cards),
                format_score(record.score),
                record.outcome.name(),
                format_rolling(record),
            )?;
        }
        Ok(())
    }

    fn write_prompt<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(
            output,
            "[P {} | B {}] {}",
            format_cards(self.round.get_player_cards()),
            format_cards(self.round.get_banker_cards()),
            self.round.next_step().message(),
        )?;
        match self.round.next_step() {
            NextStep::NeedCard(side, _) => {
                let position = self.round.next_position().unwrap_or_default();
                writeln!(output, "Next: card {} to {}", position, side.name())
            }
            NextStep::Complete(_) => {
                writeln!(output, "{}", format_summary(&self.round, &self.weights))
            }
            NextStep::Invalid(_) => writeln!(output, "Use undo or clear to fix the round"),
        }
    }
}
