//! Fake records used when the remote source returns fewer books than asked.

use fake::{
    faker::{
        address::en::CountryName,
        company::en::{CatchPhrase, CompanyName},
        internet::en::SafeEmail,
        name::en::Name,
    },
    Fake,
};
use rand::Rng;

use super::BookRecord;

/// Generates `count` books with invented titles, authors and publishers.
pub fn books<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<BookRecord> {
    (0..count)
        .map(|_| BookRecord {
            title: title_case(&CatchPhrase().fake_with_rng::<String, _>(rng)),
            author: person_name(rng),
            publisher: CompanyName().fake_with_rng(rng),
            country: CountryName().fake_with_rng(rng),
        })
        .collect()
}

pub fn person_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    Name().fake_with_rng(rng)
}

pub fn email<R: Rng + ?Sized>(rng: &mut R) -> String {
    SafeEmail().fake_with_rng(rng)
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
