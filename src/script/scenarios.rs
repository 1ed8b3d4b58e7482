//! Built-in dispute scenarios.

use super::{Script, SummaryPayload, Turn};

const INTAKE: &str = "Intake Agent";
const TRANSACTIONS: &str = "Transaction Analysis Agent";
const FRAUD: &str = "Fraud Detection Agent";
const COMPLIANCE: &str = "Policy Compliance Agent";
const RESOLUTION: &str = "Resolution Agent";
const COMMS: &str = "Customer Communication Agent";

/// Every built-in scenario, in menu order.
pub fn all() -> Vec<Script> {
    vec![unauthorized_charge(), duplicate_charge(), undelivered_goods()]
}

/// Card-not-present fraud on a travel card.
pub fn unauthorized_charge() -> Script {
    Script::new(
        "unauthorized-charge",
        "Unauthorized card charge",
        vec![
            Turn::customer(
                "Hi, there's a $1,249.00 charge from ELECTROMART ONLINE on my card from last night. I didn't make it.",
                400,
            ),
            Turn::agent(
                INTAKE,
                "I'm sorry to hear that, Sarah. I've verified your identity through the app session and opened dispute DSP-20931 for the Visa card ending 4417.",
                900,
            ),
            Turn::agent(
                INTAKE,
                "I've classified this as a suspected unauthorized card-not-present transaction and routed it for investigation.",
                600,
            ),
            Turn::agent(
                TRANSACTIONS,
                "The charge posted at 02:14 from a merchant you have never used. Your last 90 days show no electronics purchases above $200.",
                700,
            ),
            Turn::agent(
                FRAUD,
                "The order used a new device fingerprint and shipped to an address 1,100 miles from your registered location. Risk score: 94 of 100.",
                800,
            ),
            Turn::agent(
                FRAUD,
                "Two test authorizations of $1.00 preceded the charge. This matches a known card-testing pattern, so I've blocked the card.",
                600,
            ),
            Turn::customer("Will I get my money back?", 700),
            Turn::agent(
                COMPLIANCE,
                "Under Regulation E and Visa reason code 10.4 you are not liable for this charge. We must provide provisional credit within 10 business days.",
                800,
            ),
            Turn::agent(
                RESOLUTION,
                "I've issued a provisional credit of $1,249.00, filed a chargeback with the merchant's bank, and ordered a replacement card.",
                700,
            ),
            Turn::agent(
                COMMS,
                "You'll see the credit within minutes. Your new card arrives in 2-3 business days and we'll message you when the chargeback is final.",
                700,
            ),
            Turn::customer("That was fast. Thank you!", 600),
            Turn::summary(
                SummaryPayload::new("Dispute resolved")
                    .metric("Resolution time", "3 min 42 s")
                    .metric("Agents involved", "6")
                    .metric("Customer liability", "$0.00")
                    .metric("Manual touches", "0")
                    .outcome("Provisional credit issued, chargeback filed, card replaced"),
                800,
            ),
        ],
    )
    .with_description("Card-not-present fraud detected and credited in one conversation")
}

/// The same subscription billed twice.
pub fn duplicate_charge() -> Script {
    Script::new(
        "duplicate-charge",
        "Duplicate merchant charge",
        vec![
            Turn::customer(
                "I was charged twice for my StreamPlus subscription this month, $15.99 both times.",
                400,
            ),
            Turn::agent(
                INTAKE,
                "Thanks, Marcus. I've opened dispute DSP-20977 on your debit card and tagged it as a possible duplicate processing error.",
                800,
            ),
            Turn::agent(
                TRANSACTIONS,
                "I found two $15.99 StreamPlus charges on the 3rd, 41 seconds apart, with different authorization codes but the same order reference.",
                700,
            ),
            Turn::agent(
                TRANSACTIONS,
                "Your previous 11 months show exactly one StreamPlus charge per billing cycle.",
                500,
            ),
            Turn::agent(
                COMPLIANCE,
                "This qualifies as Mastercard reason code 4834, duplicate processing. No fraud review is required for a merchant error.",
                800,
            ),
            Turn::agent(
                RESOLUTION,
                "I've credited $15.99 back to your account and sent a duplicate-processing chargeback to the merchant's acquirer.",
                700,
            ),
            Turn::customer("Do I need to cancel my subscription?", 600),
            Turn::agent(
                COMMS,
                "No, your subscription stays active. Only the extra charge was reversed, and you'll see it as a separate credit line.",
                700,
            ),
            Turn::summary(
                SummaryPayload::new("Dispute resolved")
                    .metric("Resolution time", "1 min 58 s")
                    .metric("Agents involved", "5")
                    .metric("Amount credited", "$15.99")
                    .metric("Manual touches", "0")
                    .outcome("Duplicate charge reversed, merchant notified"),
                800,
            ),
        ],
    )
    .with_description("A merchant processing error detected and reversed without fraud review")
}

/// Paid order never arrived; merchant unresponsive.
pub fn undelivered_goods() -> Script {
    Script::new(
        "undelivered-goods",
        "Undelivered goods chargeback",
        vec![
            Turn::customer(
                "I paid $389 for a standing desk five weeks ago. It never arrived and the seller stopped answering my emails.",
                400,
            ),
            Turn::agent(
                INTAKE,
                "I'm sorry about that, Priya. I've opened dispute DSP-21012 for the credit card ending 0932 as merchandise not received.",
                800,
            ),
            Turn::agent(
                INTAKE,
                "I've attached the order confirmation and the three unanswered emails you forwarded from your inbox.",
                500,
            ),
            Turn::agent(
                TRANSACTIONS,
                "The $389.00 charge to DESKWORKS LLC posted on the 2nd. The promised delivery date was 21 days later and has passed.",
                700,
            ),
            Turn::agent(
                FRAUD,
                "The purchase came from your usual device and location, so this is a merchant dispute, not card fraud. Your card stays active.",
                800,
            ),
            Turn::agent(
                COMPLIANCE,
                "Visa reason code 13.1 applies. The expected delivery date has passed and you contacted the merchant, so the dispute is eligible.",
                800,
            ),
            Turn::customer("What if the desk shows up later?", 700),
            Turn::agent(
                COMPLIANCE,
                "If it arrives, let us know within 15 days and we'll withdraw the dispute. Otherwise no action is needed from you.",
                600,
            ),
            Turn::agent(
                RESOLUTION,
                "I've issued a provisional credit of $389.00 and filed the chargeback. The merchant has 30 days to respond with proof of delivery.",
                700,
            ),
            Turn::agent(
                COMMS,
                "You're all set. We'll update you when the merchant responds or the 30-day window closes, whichever comes first.",
                700,
            ),
            Turn::summary(
                SummaryPayload::new("Dispute filed")
                    .metric("Resolution time", "2 min 35 s")
                    .metric("Agents involved", "6")
                    .metric("Provisional credit", "$389.00")
                    .metric("Evidence items", "4")
                    .outcome("Chargeback filed, customer credited pending merchant response"),
                800,
            ),
        ],
    )
    .with_description("Merchandise-not-received chargeback with evidence gathering")
}
