use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{Entity, EntityCore};
use crate::error::DomainResult;
use crate::rules::{BrokenRule, BrokenRuleCollection, RuleValidator, Validatable, ValidatorRegistry};
use crate::values::{Enumeration, ValueObject};

// ============================================================================
// Order Value Objects
// ============================================================================

/// Line data as it travels inside events
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Shipped,
    Cancelled,
}

impl Enumeration for OrderStatus {
    const ALL: &'static [Self] = &[
        OrderStatus::Draft,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ];
    const KIND: &'static str = "order status";

    fn id(&self) -> i32 {
        match self {
            OrderStatus::Draft => 1,
            OrderStatus::Confirmed => 2,
            OrderStatus::Shipped => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "Draft",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

// ============================================================================
// Shipping Address - never exists in an invalid state
// ============================================================================

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ShippingAddress {
    street: String,
    city: String,
    postal_code: String,
    country: String,
}

impl ShippingAddress {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> DomainResult<Self> {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
        .validated()
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

// Deserialized addresses go through the same validation as `new`
impl<'de> Deserialize<'de> for ShippingAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawShippingAddress {
            street: String,
            city: String,
            postal_code: String,
            country: String,
        }

        let raw = RawShippingAddress::deserialize(deserializer)?;
        ShippingAddress::new(raw.street, raw.city, raw.postal_code, raw.country)
            .map_err(serde::de::Error::custom)
    }
}

struct AddressFieldsRequired;

impl RuleValidator<ShippingAddress> for AddressFieldsRequired {
    fn add_rules(&self, subject: &ShippingAddress, rules: &mut BrokenRuleCollection) {
        let fields = [
            ("street", &subject.street, "Street is required"),
            ("city", &subject.city, "City is required"),
            ("country", &subject.country, "Country is required"),
        ];
        for (property, value, message) in fields {
            if value.trim().is_empty() {
                rules.add(BrokenRule::error(property, message));
            }
        }
    }
}

struct PostalCodeFormat;

impl RuleValidator<ShippingAddress> for PostalCodeFormat {
    fn add_rules(&self, subject: &ShippingAddress, rules: &mut BrokenRuleCollection) {
        let code = subject.postal_code.trim();
        let well_formed = (3..=10).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-');

        if !well_formed {
            rules.add(BrokenRule::error(
                "postalCode",
                "Postal code must be 3 to 10 letters, digits, spaces or dashes",
            ));
        }
    }
}

impl Validatable for ShippingAddress {
    fn add_validators(registry: &mut ValidatorRegistry<Self>) {
        registry.add(AddressFieldsRequired);
        registry.add(PostalCodeFormat);
    }
}

impl ValueObject for ShippingAddress {}

// ============================================================================
// Order Line - child entity inside the order boundary
// ============================================================================

#[derive(Serialize, Clone, Debug)]
pub struct OrderLine {
    #[serde(flatten)]
    item: OrderItem,
    #[serde(skip)]
    entity: EntityCore<OrderLine>,
}

impl OrderLine {
    pub fn new(item: OrderItem) -> Self {
        let mut line = Self {
            item,
            entity: EntityCore::new(),
        };
        line.validate();
        line
    }

    pub fn item(&self) -> &OrderItem {
        &self.item
    }

    pub fn total_cents(&self) -> i64 {
        self.item.unit_price_cents * i64::from(self.item.quantity)
    }
}

struct PositiveQuantity;

impl RuleValidator<OrderLine> for PositiveQuantity {
    fn add_rules(&self, subject: &OrderLine, rules: &mut BrokenRuleCollection) {
        if subject.item.quantity <= 0 {
            rules.add(BrokenRule::error("quantity", "Quantity must be greater than zero"));
        }
    }
}

struct NonNegativePrice;

impl RuleValidator<OrderLine> for NonNegativePrice {
    fn add_rules(&self, subject: &OrderLine, rules: &mut BrokenRuleCollection) {
        if subject.item.unit_price_cents < 0 {
            rules.add(BrokenRule::error("unitPrice", "Unit price cannot be negative"));
        }
    }
}

impl Validatable for OrderLine {
    fn guard(&self, rules: &mut BrokenRuleCollection) {
        if self.item.product_id.is_nil() {
            rules.add(BrokenRule::error("productId", "Product is required"));
        }
    }

    fn add_validators(registry: &mut ValidatorRegistry<Self>) {
        registry.add(PositiveQuantity);
        registry.add(NonNegativePrice);
    }
}

impl Entity for OrderLine {
    fn entity(&self) -> &EntityCore<Self> {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut EntityCore<Self> {
        &mut self.entity
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
