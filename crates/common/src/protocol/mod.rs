mod bridge;
mod listing;
mod outcome;

pub use bridge::{Bridge, Config, Handle};
pub use listing::{
    decode_listing, encode_listing, format_timestamp, listing_conflict, split_on, ListingRow, FIELD_SEPARATOR,
    ROW_SEPARATOR, TIMESTAMP_FORMAT,
};
pub use outcome::{Failure, Outcome};
