//! The dialogs for recording a new income or expense from the dashboard.

use maud::{Markup, html};
use time::Date;

use crate::{
    category::{Category, category_picker},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::schema::{FieldError, RawAmount, TransactionInput, error_for},
    transaction_type::TransactionType,
};

/// The values shown in the transaction form's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFormValues {
    /// The amount as typed.
    pub amount: String,
    /// The description as typed.
    pub description: String,
    /// The date as `YYYY-MM-DD`.
    pub date: String,
    /// The name of the chosen category.
    pub category: String,
}

impl TransactionFormValues {
    /// The values for a blank form: zero, today and no category.
    pub fn defaults(today: Date) -> Self {
        Self {
            amount: "0".to_owned(),
            description: String::new(),
            date: today.to_string(),
            category: String::new(),
        }
    }

    /// The values the user submitted, so they can be corrected.
    pub fn from_input(input: &TransactionInput) -> Self {
        Self {
            amount: match &input.amount {
                RawAmount::Number(number) => number.to_string(),
                RawAmount::Text(text) => text.clone(),
            },
            description: input.description.clone().unwrap_or_default(),
            date: input.date.clone(),
            category: input.category.clone(),
        }
    }
}

/// The ID of the dialog for creating a transaction of `transaction_type`.
pub fn dialog_id(transaction_type: TransactionType) -> String {
    format!("create-transaction-dialog-{transaction_type}")
}

/// Render the form for creating a transaction of `transaction_type`.
///
/// Field errors are shown under their inputs. A rejected form replaces
/// itself, any other error goes to the alert container.
pub fn create_transaction_form(
    transaction_type: TransactionType,
    categories: &[Category],
    values: &TransactionFormValues,
    errors: &[FieldError],
) -> Markup {
    let form_id = format!("create-transaction-form-{transaction_type}");
    let amount_id = format!("amount-{transaction_type}");
    let description_id = format!("description-{transaction_type}");
    let date_id = format!("date-{transaction_type}");

    html! {
        form
            id=(form_id)
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-swap="outerHTML"
            hx-target-422="this"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            input type="hidden" name="type" value=(transaction_type);

            @if let Some(message) = error_for(errors, "type") {
                p class=(FORM_ERROR_STYLE) { (message) }
            }

            div
            {
                label for=(amount_id) class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    name="amount"
                    id=(amount_id)
                    type="number"
                    step="0.01"
                    value=(values.amount)
                    class=(FORM_TEXT_INPUT_STYLE);

                @if let Some(message) = error_for(errors, "amount") {
                    p class=(FORM_ERROR_STYLE) { (message) }
                } @else {
                    p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                    {
                        "Transaction amount (required)"
                    }
                }
            }

            div
            {
                label for=(description_id) class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id=(description_id)
                    type="text"
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                {
                    "Transaction description (optional)"
                }
            }

            (category_picker(transaction_type, categories, &values.category))

            div
            {
                label for=(date_id) class=(FORM_LABEL_STYLE) { "Transaction date" }

                input
                    name="date"
                    id=(date_id)
                    type="date"
                    value=(values.date)
                    class=(FORM_TEXT_INPUT_STYLE);

                @if let Some(message) = error_for(errors, "date") {
                    p class=(FORM_ERROR_STYLE) { (message) }
                }
            }

            div class="flex gap-4"
            {
                button
                    type="button"
                    onclick="this.closest('form').reset(); this.closest('dialog').close()"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Cancel"
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="htmx-indicator" { "Creating... " }
                    "Create"
                }
            }
        }
    }
}

/// Render the button that opens the dialog and the dialog itself.
///
/// The dialog closes when a transaction is created successfully.
pub fn create_transaction_dialog(
    transaction_type: TransactionType,
    categories: &[Category],
    today: Date,
) -> Markup {
    let id = dialog_id(transaction_type);
    let open_dialog = format!("document.getElementById('{id}').showModal()");
    let (trigger_label, title_class) = match transaction_type {
        TransactionType::Income => ("New income 🤑", "text-emerald-500"),
        TransactionType::Expense => ("New expense 😤", "text-rose-500"),
    };
    let trigger_style = match transaction_type {
        TransactionType::Income => {
            "px-4 py-2 rounded border border-emerald-500 bg-emerald-950 text-white \
            hover:bg-emerald-700"
        }
        TransactionType::Expense => {
            "px-4 py-2 rounded border border-rose-500 bg-rose-950 text-white hover:bg-rose-700"
        }
    };

    html! {
        button type="button" onclick=(open_dialog) class=(trigger_style)
        {
            (trigger_label)
        }

        dialog
            id=(id)
            hx-on-transaction-created="this.close()"
            class="w-full max-w-md p-6 rounded-lg bg-white dark:bg-gray-800 \
                dark:text-white backdrop:bg-black/50"
        {
            h2 class="mb-4 text-lg font-semibold"
            {
                "Create a new "
                span class=(title_class) { (transaction_type) }
                " transaction"
            }

            (create_transaction_form(
                transaction_type,
                categories,
                &TransactionFormValues::defaults(today),
                &[],
            ))
        }
    }
}

#[cfg(test)]
mod create_dialog_tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_valid_html, must_get_form,
        },
        transaction::schema::FieldError,
        transaction_type::TransactionType,
    };

    use super::{
        TransactionFormValues, create_transaction_dialog, create_transaction_form, dialog_id,
    };

    #[test]
    fn dialog_form_has_defaults() {
        let markup = create_transaction_dialog(TransactionType::Expense, &[], date!(2025 - 06 - 15));

        let html = Html::parse_fragment(&markup.into_string());
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input_with_value(&form, "amount", "number", "0");
        assert_form_input_with_value(&form, "date", "date", "2025-06-15");
        assert_form_input_with_value(&form, "description", "text", "");
        assert_form_input_with_value(&form, "type", "hidden", "expense");
    }

    #[test]
    fn trigger_opens_matching_dialog() {
        let markup = create_transaction_dialog(TransactionType::Income, &[], date!(2025 - 06 - 15));

        let html = Html::parse_fragment(&markup.into_string());
        let button = html
            .select(&Selector::parse("button").unwrap())
            .next()
            .unwrap();
        assert_eq!(button.text().collect::<String>(), "New income 🤑");
        let id = dialog_id(TransactionType::Income);
        assert!(
            button
                .value()
                .attr("onclick")
                .is_some_and(|onclick| onclick.contains(&id))
        );
        let dialog = html
            .select(&Selector::parse("dialog").unwrap())
            .next()
            .unwrap();
        assert_eq!(dialog.value().attr("id"), Some(id.as_str()));
        assert_eq!(
            dialog.value().attr("hx-on-transaction-created"),
            Some("this.close()")
        );
    }

    #[test]
    fn form_shows_field_errors_and_keeps_values() {
        let values = TransactionFormValues {
            amount: "10.005".to_owned(),
            description: "Snacks".to_owned(),
            date: "bad".to_owned(),
            category: String::new(),
        };
        let errors = vec![
            FieldError {
                field: "amount",
                message: "Number must be a multiple of 0.01".to_owned(),
            },
            FieldError {
                field: "date",
                message: "Invalid date".to_owned(),
            },
        ];

        let markup =
            create_transaction_form(TransactionType::Expense, &[], &values, &errors);

        let html = Html::parse_fragment(&markup.into_string());
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "amount", "number", "10.005");
        assert_form_input_with_value(&form, "description", "text", "Snacks");
        assert_form_error_message(&form, "Number must be a multiple of 0.01");
        assert_form_error_message(&form, "Invalid date");
    }
}
