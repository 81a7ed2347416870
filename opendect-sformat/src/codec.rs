//! S-format message parse and build drivers
//!
//! The drivers walk a message descriptor in step with the message buffer.
//! Parsing polices direction-dependent presence, tolerates corrupt optional
//! elements and accumulates repeated elements into lists; building emits
//! the elements of a collection in descriptor order, inserting a
//! <<REPEAT-INDICATOR>> only ahead of lists with two or more elements.

use opendect_common::{DectRole, MsgBuf};
use tracing::{debug, trace};

use crate::collection::{IeCollection, ListOrder};
use crate::error::{SfmtError, SfmtResult};
use crate::ie::{parse_ie_header, IeType, IE_FIXED_LEN, IE_FIXED_VAL_MASK};
use crate::ies::Ie;
use crate::msg::{IeDescEntry, IeStatus, MsgDescriptor};

/// Maximum payload of a variable-length IE.
const IE_MAX_PAYLOAD: usize = 255;

/// Parses an S-format message body against its descriptor.
///
/// `mb` holds the IE stream with the message-type octet already consumed.
/// Returns the filled collection, keyed by the descriptor's IE types.
pub fn parse_message(
    role: DectRole,
    desc: &MsgDescriptor,
    mb: &mut MsgBuf,
) -> SfmtResult<IeCollection> {
    trace!("parse {{{}}} message", desc.name);

    let entries = desc.entries;
    let mut collection = IeCollection::new();
    let mut idx = 0;
    let mut pending_order: Option<ListOrder> = None;

    'msg: while !mb.is_empty() {
        let hdr = parse_ie_header(mb)?;

        // Locate a matching descriptor entry, applying policy checks.
        let entry: &IeDescEntry = loop {
            let Some(entry) = entries.get(idx) else {
                // Trailing elements the descriptor does not know are ignored.
                break 'msg;
            };
            let matches = entry.ie.wire_id() == hdr.id;

            match entry.rx_status(role) {
                IeStatus::Mandatory => {
                    if matches {
                        break entry;
                    }
                    return Err(SfmtError::MandatoryIeMissing(entry.ie.name()));
                }
                IeStatus::None => {
                    if matches {
                        return Err(SfmtError::InvalidIe(entry.ie.name()));
                    }
                }
                IeStatus::Optional => {
                    if matches {
                        break entry;
                    }
                    if entry.ie == IeType::SingleDisplay
                        && hdr.id == IeType::MultiDisplay.wire_id()
                    {
                        break entry;
                    }
                    if entry.ie == IeType::SingleKeypad
                        && hdr.id == IeType::MultiKeypad.wire_id()
                    {
                        break entry;
                    }
                }
            }
            idx += 1;
        };

        let raw = &mb.slice()[..hdr.len];

        if entry.ie == IeType::RepeatIndicator {
            // The list ordering applies to the repeatable element that
            // follows in the descriptor.
            pending_order = ListOrder::from_wire(raw[0] & IE_FIXED_VAL_MASK);
            if pending_order.is_none() {
                debug!("invalid list type {:#04x}", raw[0] & IE_FIXED_VAL_MASK);
            }
            mb.pull(hdr.len).expect("header verified IE length");
            idx += 1;
            continue;
        }

        // Treat empty variable-length IEs as absent.
        if hdr.id & IE_FIXED_LEN == 0 && hdr.len == 2 {
            trace!("  IE <<{}>> empty", entry.ie.name());
            mb.pull(hdr.len).expect("header verified IE length");
            idx += 1;
            continue;
        }

        let wire_ty = IeType::from_wire(hdr.id).expect("matched entries have known types");
        match Ie::parse(wire_ty, raw) {
            Ok(parsed) => {
                trace!("  IE <<{}>> len {}", entry.ie.name(), hdr.len);
                collection.add(parsed);
                if entry.repeat {
                    if let Some(order) = pending_order.take() {
                        collection.set_order(entry.ie, order);
                    }
                }
            }
            Err(err) => {
                // Corrupt optional IEs are ignored for interoperability.
                if entry.rx_status(role) == IeStatus::Mandatory {
                    debug!("  IE <<{}>>: {}", entry.ie.name(), err);
                    return Err(SfmtError::MandatoryIeError(entry.ie.name()));
                }
                debug!("  ignoring corrupt IE <<{}>>: {}", entry.ie.name(), err);
            }
        }

        mb.pull(hdr.len).expect("header verified IE length");
        if !entry.repeat {
            idx += 1;
        }
    }

    // All remaining entries must be without mandatory expectation.
    for entry in &entries[idx.min(entries.len())..] {
        if entry.rx_status(role) == IeStatus::Mandatory {
            return Err(SfmtError::MandatoryIeMissing(entry.ie.name()));
        }
    }

    Ok(collection)
}

/// Builds an S-format message body from a collection.
///
/// Elements are emitted in descriptor order; the collection supplies the
/// values. Fails with `MandatoryIeMissing` when a mandatory element is
/// absent and `InvalidIe` when an element is not allowed in the
/// transmission direction.
pub fn build_message(
    role: DectRole,
    desc: &MsgDescriptor,
    collection: &IeCollection,
    mb: &mut MsgBuf,
) -> SfmtResult<()> {
    trace!("build {{{}}} message", desc.name);

    let entries = desc.entries;
    let mut idx = 0;

    while idx < entries.len() {
        let entry = &entries[idx];

        if entry.ie == IeType::RepeatIndicator {
            let Some(rep_entry) = entries.get(idx + 1).filter(|e| e.repeat) else {
                idx += 1;
                continue;
            };

            let list = collection.list(rep_entry.ie);
            if list.is_empty() {
                idx += 2;
                continue;
            }

            // The repeat indicator is only present for real lists.
            if list.len() >= 2 {
                if entry.tx_status(role) == IeStatus::None {
                    return Err(SfmtError::InvalidIe(entry.ie.name()));
                }
                let order = collection.order(rep_entry.ie);
                mb.append_u8(IeType::RepeatIndicator.wire_id() | order as u8)
                    .map_err(|_| SfmtError::Truncated)?;
            }

            for item in list {
                build_ie(role, rep_entry, item, mb)?;
            }
            idx += 2;
        } else {
            match collection.get(entry.ie) {
                Some(item) => build_ie(role, entry, item, mb)?,
                None => {
                    if entry.tx_status(role) == IeStatus::Mandatory {
                        debug!("  IE <<{}>> missing", entry.ie.name());
                        return Err(SfmtError::MandatoryIeMissing(entry.ie.name()));
                    }
                }
            }
            idx += 1;
        }
    }

    Ok(())
}

fn build_ie(
    role: DectRole,
    entry: &IeDescEntry,
    item: &Ie,
    mb: &mut MsgBuf,
) -> SfmtResult<()> {
    if entry.tx_status(role) == IeStatus::None {
        debug!("  IE <<{}>> not allowed", entry.ie.name());
        return Err(SfmtError::InvalidIe(entry.ie.name()));
    }
    encode_ie(entry.ie, item, mb)
}

/// Encodes one IE with its header framing and appends it to the buffer.
///
/// Exposed for raw IE construction (e.g. the CLMS fixed message path).
pub fn encode_ie(ty: IeType, item: &Ie, mb: &mut MsgBuf) -> SfmtResult<()> {
    let mut ty = ty;

    // Promote single display/keypad to the multi form when needed.
    if ty == IeType::SingleDisplay {
        if let Ie::Display(display) = item {
            if display.info.len() > 1 {
                ty = IeType::MultiDisplay;
            }
        }
    }
    if ty == IeType::SingleKeypad {
        if let Ie::Keypad(keypad) = item {
            if keypad.info.len() > 1 {
                ty = IeType::MultiKeypad;
            }
        }
    }

    let mut payload = Vec::new();
    item.build(&mut payload)?;

    if ty.is_fixed() {
        if ty.is_double_octet() {
            debug_assert_eq!(payload.len(), 1);
            mb.append(&[ty.wire_id(), payload[0]])
                .map_err(|_| SfmtError::Truncated)?;
        } else {
            debug_assert!(payload.is_empty());
            mb.append_u8(ty.wire_id()).map_err(|_| SfmtError::Truncated)?;
        }
    } else {
        // An empty variable-length IE carries no information; elide it.
        if payload.is_empty() {
            return Ok(());
        }
        if payload.len() > IE_MAX_PAYLOAD {
            return Err(SfmtError::InvalidContents("IE payload too long"));
        }
        mb.append(&[ty.wire_id(), payload.len() as u8])
            .map_err(|_| SfmtError::Truncated)?;
        mb.append(&payload).map_err(|_| SfmtError::Truncated)?;
    }
    Ok(())
}
