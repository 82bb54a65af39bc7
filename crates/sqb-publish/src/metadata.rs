use serde::Serialize;
use sqb_schemas::SquareId;

/// ERC-721 metadata document for one square.
#[derive(Debug, Serialize)]
pub struct SquareMetadata {
    name: String,
    description: String,
    image: String,
    external_url: String,
    attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
struct Attribute {
    trait_type: &'static str,
    value: AttributeValue,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AttributeValue {
    Number(u64),
    Text(&'static str),
}

impl SquareMetadata {
    pub fn build(
        id: SquareId,
        description: String,
        image_base_url: &str,
        external_base_url: &str,
    ) -> Self {
        let padded = id.padded();
        Self {
            name: format!("Square #{padded}"),
            description,
            image: format!("{image_base_url}/{padded}.svg"),
            external_url: format!("{external_base_url}#{padded}"),
            attributes: vec![
                Attribute {
                    trait_type: "Row",
                    value: AttributeValue::Number(id.row() as u64),
                },
                Attribute {
                    trait_type: "Column",
                    value: AttributeValue::Number(id.column() as u64),
                },
                Attribute {
                    trait_type: "Manhattan distance to center",
                    value: AttributeValue::Number(id.manhattan_distance_to_center() as u64),
                },
                Attribute {
                    trait_type: "Prime divisors",
                    value: AttributeValue::Number(prime_divisor_count(id.get() as u64)),
                },
                Attribute {
                    trait_type: "Palindrome",
                    value: AttributeValue::Text(palindrome_class(id.get() as u64)),
                },
            ],
        }
    }
}

/// Count of prime divisors with multiplicity; 12 = 2·2·3 counts three.
fn prime_divisor_count(mut n: u64) -> u64 {
    let mut count = 0;
    let mut divisor = 2;
    while n > 1 {
        if n % divisor == 0 {
            count += 1;
            n /= divisor;
        } else {
            divisor += 1;
        }
    }
    count
}

fn palindrome_class(n: u64) -> &'static str {
    let digits = n.to_string();
    if let Some((&first, rest)) = digits.as_bytes().split_first() {
        if rest.iter().all(|&d| d == first) {
            return "ALL SAME DIGIT";
        }
    }
    if digits.chars().rev().collect::<String>() == digits {
        return "PALINDROME";
    }
    "NOT A PALINDROME"
}
