//! Import-input resolution and channel guessing
//!
//! The raw input is resolved once into [`ImportItem`]s. Channel and
//! mobile-layout guesses are pure functions of the counters gathered on the
//! way, so they can be tested on their own.

use std::collections::BTreeSet;

use mailup_domain::{
    ImportChannel, ImportInput, ImportItem, ImportOptions, MailUpError, MobileInputType,
    RawRecord, Result, SubscriberFields,
};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w@\w").expect("EMAIL_SHAPE should compile - this is a bug"));
static PHONE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d\d\d").expect("PHONE_SHAPE should compile - this is a bug"));

/// Running counters of email-like and SMS-like evidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub email: usize,
    pub sms: usize,
}

impl Signals {
    /// Evidence carried by one bare value.
    pub fn of_line(line: &str) -> Self {
        Self {
            email: usize::from(EMAIL_SHAPE.is_match(line)),
            sms: usize::from(PHONE_SHAPE.is_match(line)),
        }
    }

    fn add(&mut self, other: Self) {
        self.email += other.email;
        self.sms += other.sms;
    }
}

/// Decide the channel of a batch from its signals.
///
/// In single-guess mode (every record was a bare value) the stronger signal
/// wins. Otherwise any email evidence together with any SMS evidence means
/// both channels.
///
/// # Errors
/// `Validation` when the signals tie in single-guess mode, or when there is
/// no evidence at all.
pub fn guess_channel(signals: Signals, single_guess: bool) -> Result<ImportChannel> {
    let channel = if single_guess {
        match signals.email.cmp(&signals.sms) {
            std::cmp::Ordering::Greater => Some(ImportChannel::Email),
            std::cmp::Ordering::Less => Some(ImportChannel::Sms),
            std::cmp::Ordering::Equal => None,
        }
    } else {
        match (signals.email > 0, signals.sms > 0) {
            (true, true) => Some(ImportChannel::EmailAndSms),
            (true, false) => Some(ImportChannel::Email),
            (false, true) => Some(ImportChannel::Sms),
            (false, false) => None,
        }
    };
    channel.ok_or_else(|| MailUpError::validation("Unable to guess the import type"))
}

/// Mobile layout: separate fields as soon as one record supplied a prefix.
pub fn guess_mobile_input_type(some_prefix: bool) -> MobileInputType {
    if some_prefix {
        MobileInputType::PrefixAndNumber
    } else {
        MobileInputType::Merged
    }
}

/// A batch ready to be serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBatch {
    pub items: Vec<ImportItem>,
    pub channel: ImportChannel,
    pub mobile_input_type: MobileInputType,
    /// Every custom field id used by any record, ascending
    pub custom_field_ids: BTreeSet<u32>,
}

enum Pending {
    Ready(ImportItem),
    Guess(String),
}

/// Resolve raw input into items, guessing whatever `options` leaves open.
///
/// Empty lines and records without any key are skipped.
///
/// # Errors
/// `Validation` when nothing is left to import, the channel cannot be
/// guessed, or bare values are pinned to the combined channel.
pub fn resolve_batch(input: ImportInput, options: &ImportOptions) -> Result<ResolvedBatch> {
    let records: Vec<RawRecord> = match input {
        ImportInput::RawLines(lines) => lines.into_iter().map(RawRecord::Line).collect(),
        ImportInput::RawRecords(records) => records,
    };

    let mut signals = Signals::default();
    let mut some_prefix = false;
    let mut any_structured = false;
    let mut custom_field_ids = BTreeSet::new();
    let mut pending = Vec::with_capacity(records.len());

    for record in records {
        match record {
            RawRecord::Fields(fields) => {
                if fields.is_empty() {
                    continue;
                }
                any_structured = true;
                custom_field_ids.extend(fields.custom.keys().copied());
                let (item, record_signals, has_prefix) = structured_item(fields);
                signals.add(record_signals);
                some_prefix |= has_prefix;
                pending.push(Pending::Ready(item));
            }
            RawRecord::Line(line) => {
                if line.is_empty() {
                    continue;
                }
                match options.channel {
                    Some(ImportChannel::Email) => {
                        pending.push(Pending::Ready(ImportItem { email: Some(line), ..ImportItem::default() }));
                    }
                    Some(ImportChannel::Sms) => {
                        pending.push(Pending::Ready(ImportItem { number: Some(line), ..ImportItem::default() }));
                    }
                    Some(ImportChannel::EmailAndSms) => {
                        return Err(MailUpError::validation(
                            "Bare values can only be imported as email or as SMS",
                        ));
                    }
                    None => {
                        signals.add(Signals::of_line(&line));
                        pending.push(Pending::Guess(line));
                    }
                }
            }
        }
    }

    if pending.is_empty() {
        return Err(MailUpError::validation("No data to send"));
    }

    let channel = match options.channel {
        Some(channel) => channel,
        None => guess_channel(signals, !any_structured)?,
    };

    let items = pending
        .into_iter()
        .map(|entry| match entry {
            Pending::Ready(item) => item,
            Pending::Guess(line) => assign_line(line, channel, !any_structured),
        })
        .collect();

    Ok(ResolvedBatch {
        items,
        channel,
        mobile_input_type: options
            .mobile_input_type
            .unwrap_or_else(|| guess_mobile_input_type(some_prefix)),
        custom_field_ids,
    })
}

fn structured_item(fields: SubscriberFields) -> (ImportItem, Signals, bool) {
    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
    let email = non_empty(fields.email);
    let number = non_empty(fields.phone);
    let prefix = non_empty(fields.prefix);

    let signals = Signals {
        email: usize::from(email.is_some()),
        sms: usize::from(number.is_some()) + usize::from(prefix.is_some()),
    };
    let has_prefix = prefix.is_some();

    let item = ImportItem { email, prefix, number, name: fields.name, custom_fields: fields.custom };
    (item, signals, has_prefix)
}

/// Place a bare value in the field of the decided channel. In mixed batches
/// the value's own shape decides, falling back to the channel.
fn assign_line(line: String, channel: ImportChannel, single_guess: bool) -> ImportItem {
    let as_phone = if single_guess {
        channel == ImportChannel::Sms
    } else {
        let shape = Signals::of_line(&line);
        match (shape.email > 0, shape.sms > 0) {
            (true, _) => false,
            (false, true) => true,
            (false, false) => channel == ImportChannel::Sms,
        }
    };

    if as_phone {
        ImportItem { number: Some(line), ..ImportItem::default() }
    } else {
        ImportItem { email: Some(line), ..ImportItem::default() }
    }
}
