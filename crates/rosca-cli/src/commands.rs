use std::io::{self, BufRead, Write};

use anyhow::bail;
use clap::Parser;
use colored::Colorize;
use rosca_ledger::pairing::partner_of;
use rosca_ledger::payer::resolve_payer;
use rosca_ledger::{
    CommitteeInput, CommitteeLedger, DrawInput, LedgerError, LedgerReader, MemberInput,
    PaymentInput, ProjectionBuilder, SnapshotValidator,
};
use rosca_store::JsonFileStore;
use rosca_types::{Committee, CommitteeId, Member, PayerId, ShareType};
use serde::Serialize;
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;
use crate::shell::split_line;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let store = JsonFileStore::new(cli.state.unwrap_or(config.state_path));
    let snapshot = store.load(&config.ledger);
    let ledger = CommitteeLedger::with_snapshot(snapshot, config.ledger).with_sink(store);
    let mut session = Session::new(ledger, cli.format);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Shell(_) => session.shell(io::stdin().lock(), &mut out),
        command => session.execute(command, &mut out),
    }
}

/// A ledger plus the output format, shared by one-shot commands and the shell.
pub struct Session {
    ledger: CommitteeLedger,
    format: OutputFormat,
}

impl Session {
    pub fn new(ledger: CommitteeLedger, format: OutputFormat) -> Self {
        Self { ledger, format }
    }

    pub fn ledger(&self) -> &CommitteeLedger {
        &self.ledger
    }

    pub fn execute(&mut self, command: Command, out: &mut dyn Write) -> anyhow::Result<()> {
        match command {
            Command::Committee(args) => self.committee(args.action, out),
            Command::Member(args) => self.member(args.action, out),
            Command::Payment(args) => self.payment(args.action, out),
            Command::Draw(args) => self.draw(args.action, out),
            Command::Grid(args) => self.grid(&args.committee, out),
            Command::Standings(args) => self.standings(&args.committee, out),
            Command::Verify(_) => self.verify(out),
            Command::Undo(_) => self.undo(out),
            Command::Shell(_) => bail!("already in a shell session"),
        }
    }

    /// Run commands line by line. Blank lines and `#` comments are skipped,
    /// `exit` or `quit` ends the session, and a rejected command is reported
    /// without ending it.
    pub fn shell(&mut self, input: impl BufRead, out: &mut dyn Write) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if matches!(line, "exit" | "quit") {
                break;
            }
            let args = match split_line(line) {
                Ok(args) => args,
                Err(error) => {
                    writeln!(out, "{} {error}", "error:".red().bold())?;
                    continue;
                }
            };
            let command = match ShellLine::try_parse_from(args) {
                Ok(parsed) => parsed.command,
                Err(error) => {
                    write!(out, "{error}")?;
                    continue;
                }
            };
            if let Err(error) = self.execute(command, out) {
                writeln!(out, "{} {error:#}", "error:".red().bold())?;
            }
        }
        Ok(())
    }

    // ---- Committees ----

    fn committee(&mut self, action: CommitteeAction, out: &mut dyn Write) -> anyhow::Result<()> {
        match action {
            CommitteeAction::Add { name, monthly_amount, start_date, allow_half_share } => {
                let committee = self.ledger.add_committee(CommitteeInput {
                    name,
                    monthly_amount,
                    start_date,
                    allow_half_share,
                })?;
                self.emit(out, &committee, || {
                    accepted("added committee", &committee.name, committee.id.as_str())
                })
            }
            CommitteeAction::Update { id, name, monthly_amount, start_date, allow_half_share } => {
                let current = self.committee_record(&id)?;
                let committee = self.ledger.update_committee(
                    &id,
                    CommitteeInput {
                        name: name.unwrap_or(current.name),
                        monthly_amount: monthly_amount.unwrap_or(current.monthly_amount),
                        start_date: start_date.unwrap_or(current.start_date),
                        allow_half_share: allow_half_share.unwrap_or(current.allow_half_share),
                    },
                )?;
                self.emit(out, &committee, || {
                    accepted("updated committee", &committee.name, committee.id.as_str())
                })
            }
            CommitteeAction::Delete { id } => {
                self.ledger.delete_committee(&id)?;
                self.emit(out, &json!({ "deleted": id }), || deleted("committee", id.as_str()))
            }
            CommitteeAction::List => {
                let committees = self.ledger.committees();
                self.emit(out, committees, || {
                    if committees.is_empty() {
                        return "No committees.".into();
                    }
                    committees.iter().map(committee_line).collect::<Vec<_>>().join("\n")
                })
            }
        }
    }

    // ---- Members ----

    fn member(&mut self, action: MemberAction, out: &mut dyn Write) -> anyhow::Result<()> {
        match action {
            MemberAction::Add { committee, name, phone, share, partner } => {
                let member = self.ledger.add_member(
                    &committee,
                    MemberInput { name, phone, share_type: share, partner },
                )?;
                let status = self.pair_status(&member);
                self.emit(out, &member, || {
                    let head = accepted("added member", &member.name, member.id.as_str());
                    format!("{head}{status}")
                })
            }
            MemberAction::Update { id, name, phone, share, partner, unpair } => {
                let current = self
                    .ledger
                    .member(&id)
                    .cloned()
                    .ok_or_else(|| LedgerError::MemberNotFound(id.clone()))?;
                let share_type = share.unwrap_or(current.share_type);
                let partner = match (share_type, unpair) {
                    (ShareType::Full, _) | (ShareType::Half, true) => None,
                    (ShareType::Half, false) => partner.or_else(|| {
                        partner_of(self.ledger.members(), &current).map(|p| p.id.clone())
                    }),
                };
                let member = self.ledger.update_member(
                    &id,
                    MemberInput {
                        name: name.unwrap_or(current.name),
                        phone: phone.unwrap_or(current.phone),
                        share_type,
                        partner,
                    },
                )?;
                let status = self.pair_status(&member);
                self.emit(out, &member, || {
                    let head = accepted("updated member", &member.name, member.id.as_str());
                    format!("{head}{status}")
                })
            }
            MemberAction::Delete { id } => {
                self.ledger.delete_member(&id)?;
                self.emit(out, &json!({ "deleted": id }), || deleted("member", id.as_str()))
            }
            MemberAction::List { committee } => {
                let record = self.committee_record(&committee)?;
                let members = self.ledger.members_of(&committee);
                self.emit(out, &members, || {
                    let mut lines = vec![format!(
                        "{} ({} members, {} months)",
                        record.name.bold(),
                        members.len(),
                        record.duration_months
                    )];
                    for m in &members {
                        lines.push(format!(
                            "  {}  {}  {}{}",
                            m.id.to_string().yellow(),
                            m.name,
                            m.share_type.to_string().cyan(),
                            self.pair_status(m)
                        ));
                    }
                    lines.join("\n")
                })
            }
        }
    }

    fn pair_status(&self, member: &Member) -> String {
        if !member.is_half() {
            return String::new();
        }
        match partner_of(self.ledger.members(), member) {
            Some(partner) => format!("  paired with {}", partner.name),
            None => format!("  {}", "unpaired".dimmed()),
        }
    }

    // ---- Payments ----

    fn payment(&mut self, action: PaymentAction, out: &mut dyn Write) -> anyhow::Result<()> {
        match action {
            PaymentAction::Add { committee, payer, month, amount, paid } => {
                let amount = match amount {
                    Some(amount) => amount,
                    None => self.committee_record(&committee)?.monthly_amount,
                };
                let payment = self.ledger.add_payment(
                    &committee,
                    PaymentInput { payer, month_year: month, amount, date_paid: paid },
                )?;
                let who = self.payer_name(&committee, &payment.payer);
                self.emit(out, &payment, || {
                    let mut line = format!(
                        "{} recorded {} for {} from {}",
                        "✓".green().bold(),
                        payment.amount,
                        payment.month_year,
                        who.bold()
                    );
                    if payment.late_days > 0 {
                        let late = format!(
                            "{} days late, {} demerits",
                            payment.late_days, payment.demerit_points
                        );
                        line.push_str(&format!("  {}", late.yellow()));
                    }
                    line
                })
            }
            PaymentAction::Update { id, payer, month, amount, paid } => {
                let current = self
                    .ledger
                    .payment(&id)
                    .cloned()
                    .ok_or_else(|| LedgerError::PaymentNotFound(id.clone()))?;
                let payment = self.ledger.update_payment(
                    &id,
                    PaymentInput {
                        payer: payer.unwrap_or(current.payer),
                        month_year: month.unwrap_or(current.month_year),
                        amount: amount.unwrap_or(current.amount),
                        date_paid: paid.unwrap_or(current.date_paid),
                    },
                )?;
                self.emit(out, &payment, || {
                    format!(
                        "{} updated payment {} ({} days late)",
                        "✓".green().bold(),
                        payment.id.to_string().yellow(),
                        payment.late_days
                    )
                })
            }
            PaymentAction::Delete { id } => {
                self.ledger.delete_payment(&id)?;
                self.emit(out, &json!({ "deleted": id }), || deleted("payment", id.as_str()))
            }
        }
    }

    // ---- Draws ----

    fn draw(&mut self, action: DrawAction, out: &mut dyn Write) -> anyhow::Result<()> {
        match action {
            DrawAction::Add { committee, winner, month, payout_date } => {
                let draw = self.ledger.add_draw(
                    &committee,
                    DrawInput { month_year: month, winner, payout_date },
                )?;
                let who = self.payer_name(&committee, &draw.winner);
                self.emit(out, &draw, || {
                    format!(
                        "{} draw for {}: {} receives {} on {}",
                        "✓".green().bold(),
                        draw.month_year,
                        who.bold(),
                        draw.amount,
                        draw.payout_date
                    )
                })
            }
            DrawAction::Update { id, winner, month, payout_date } => {
                let current = self
                    .ledger
                    .draw(&id)
                    .cloned()
                    .ok_or_else(|| LedgerError::DrawNotFound(id.clone()))?;
                let draw = self.ledger.update_draw(
                    &id,
                    DrawInput {
                        month_year: month,
                        winner: winner.unwrap_or(current.winner),
                        payout_date: payout_date.unwrap_or(current.payout_date),
                    },
                )?;
                self.emit(out, &draw, || {
                    format!(
                        "{} updated draw {} for {}",
                        "✓".green().bold(),
                        draw.id.to_string().yellow(),
                        draw.month_year
                    )
                })
            }
            DrawAction::Delete { id } => {
                self.ledger.delete_draw(&id)?;
                self.emit(out, &json!({ "deleted": id }), || deleted("draw", id.as_str()))
            }
            DrawAction::Eligible { committee } => {
                let eligible = self.ledger.eligible_winners(&committee)?;
                let next = self.ledger.next_draw_month(&committee)?;
                let value = json!({ "nextMonth": next, "eligible": eligible });
                self.emit(out, &value, || {
                    let mut lines = vec![format!("Next draw: {}", next.to_string().bold())];
                    if eligible.is_empty() {
                        lines.push("Every payer has already won.".into());
                    }
                    for row in &eligible {
                        lines.push(format!("  {}  {}", row.id.to_string().yellow(), row.name));
                    }
                    lines.join("\n")
                })
            }
        }
    }

    // ---- Projections ----

    fn grid(&self, committee: &CommitteeId, out: &mut dyn Write) -> anyhow::Result<()> {
        let grid = ProjectionBuilder::grid(&self.ledger, committee)?;
        self.emit(out, &grid, || {
            let width = grid
                .rows
                .iter()
                .map(|r| r.payer.name.chars().count())
                .max()
                .unwrap_or(0)
                .max("Payer".len());
            let mut header = format!("{:<width$}", "Payer");
            for month in &grid.months {
                header.push_str(&format!("  {month:<7}"));
            }
            let mut lines = vec![header.bold().to_string()];

            for row in &grid.rows {
                let mut line = format!("{:<width$}", row.payer.name);
                for cell in &row.cells {
                    let text = match cell {
                        Some(p) if p.late_days == 0 => format!("  {:<7}", "paid").green(),
                        Some(p) => format!("  {:<7}", format!("+{}d", p.late_days)).yellow(),
                        None => format!("  {:<7}", "-").dimmed(),
                    };
                    line.push_str(&text.to_string());
                }
                if row.has_won {
                    line.push_str(&format!("  {}", "won".cyan()));
                }
                lines.push(line);
            }

            let mut draws = format!("{:<width$}", "Draw");
            for draw in &grid.draws {
                let mark = if draw.is_some() { "drawn" } else { "-" };
                draws.push_str(&format!("  {mark:<7}"));
            }
            lines.push(draws.dimmed().to_string());
            lines.join("\n")
        })
    }

    fn standings(&self, committee: &CommitteeId, out: &mut dyn Write) -> anyhow::Result<()> {
        let standings = ProjectionBuilder::standings(&self.ledger, committee)?;
        let months = self.committee_record(committee)?.duration_months;
        self.emit(out, &standings, || {
            if standings.is_empty() {
                return "No payers.".into();
            }
            standings
                .iter()
                .map(|s| {
                    let demerits = format!("{} demerits", s.total_demerits);
                    format!(
                        "{}  paid {}/{}  {}{}",
                        s.payer.name.bold(),
                        s.months_paid,
                        months,
                        if s.total_demerits == 0 { demerits.green() } else { demerits.yellow() },
                        if s.has_won { "  won" } else { "" }
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    fn verify(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        let report =
            SnapshotValidator::validate(self.ledger.snapshot(), self.ledger.config().due_day);
        self.emit(out, &report, || {
            if report.is_valid() {
                return format!(
                    "{} {} committees checked, no violations",
                    "✓".green().bold(),
                    report.committees_checked
                );
            }
            report
                .violations
                .iter()
                .map(|v| {
                    let mark = "✗".red().bold();
                    format!("{mark} {:?} {}: {}", v.kind, v.entity.yellow(), v.description)
                })
                .collect::<Vec<_>>()
                .join("\n")
        })?;
        if !report.is_valid() {
            bail!("{} invariant violations found", report.violations.len());
        }
        Ok(())
    }

    fn undo(&mut self, out: &mut dyn Write) -> anyhow::Result<()> {
        let undone = self.ledger.undo();
        let remaining = self.ledger.history_len();
        self.emit(out, &json!({ "undone": undone, "remaining": remaining }), || {
            if undone {
                format!("{} undid last change ({remaining} more available)", "✓".green().bold())
            } else {
                "Nothing to undo.".into()
            }
        })
    }

    // ---- Helpers ----

    fn emit<T: Serialize + ?Sized>(
        &self,
        out: &mut dyn Write,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, value)?;
                writeln!(out)?;
            }
            OutputFormat::Text => writeln!(out, "{}", text())?,
        }
        Ok(())
    }

    fn committee_record(&self, id: &CommitteeId) -> Result<Committee, LedgerError> {
        self.ledger
            .committee(id)
            .cloned()
            .ok_or_else(|| LedgerError::CommitteeNotFound(id.clone()))
    }

    fn payer_name(&self, committee: &CommitteeId, payer: &PayerId) -> String {
        resolve_payer(&self.ledger, committee, payer)
            .map(|row| row.name)
            .unwrap_or_else(|| payer.to_string())
    }
}

fn committee_line(c: &Committee) -> String {
    format!(
        "{}  {}  {} x {} months from {}{}",
        c.id.to_string().yellow(),
        c.name.bold(),
        c.monthly_amount,
        c.duration_months,
        c.start_month(),
        if c.allow_half_share { "  (half shares allowed)" } else { "" }
    )
}

fn accepted(what: &str, name: &str, id: &str) -> String {
    format!("{} {what} {} ({})", "✓".green().bold(), name.bold(), id.yellow())
}

fn deleted(what: &str, id: &str) -> String {
    format!("{} deleted {what} {}", "✓".green().bold(), id.yellow())
}
