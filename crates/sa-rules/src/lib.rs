//! # sa-rules — Built-in Shadow Annotation Rules
//!
//! The rule handlers a form-backed application needs out of the box.
//!
//! | Annotation | Kind | Module |
//! |---|---|---|
//! | `notEmptyValidation` | validator | `not_empty.rs` |
//! | `emailValidation` | validator (finding key `emailFormat`) | `email.rs` |
//! | `cityParamsValidation` | validator | `city.rs` |
//! | `beanValidation` | cascade | `cascade.rs` |
//! | `arrayValidation` | cascade over list elements | `cascade.rs` |
//! | `bigConversion` | converter | `decimal.rs` |
//! | `calculation` | processor | `computed.rs` |
//!
//! [`register_builtins`] installs all of them into a [`HandlerTable`]. The
//! city rule needs a [`CityDirectory`] from the embedding application.
//!
//! ## Crate Policy
//!
//! - Rules only touch data and findings through [`sa_engine::RuleContext`].
//! - A value a rule cannot interpret is a finding or a logged no-op, never
//!   a panic.

pub mod cascade;
pub mod city;
pub mod computed;
pub mod decimal;
pub mod email;
pub mod error;
pub mod not_empty;

use std::sync::Arc;

use sa_engine::{HandlerTable, RuleHandler};

pub use cascade::{ArrayValidator, BeanValidator};
pub use city::{CityDirectory, CityParamsValidator, StaticCityDirectory};
pub use computed::{ComputedTotalConfig, ComputedTotalProcessor};
pub use decimal::DecimalConverter;
pub use email::EmailValidator;
pub use error::RulesError;
pub use not_empty::NotEmptyValidator;

/// Register every built-in rule.
pub fn register_builtins(
    table: &mut HandlerTable,
    cities: Arc<dyn CityDirectory>,
) -> Result<(), RulesError> {
    table.register(RuleHandler::validator(NotEmptyValidator));
    table.register(RuleHandler::validator(EmailValidator::new()?));
    table.register(RuleHandler::validator(CityParamsValidator::new(cities)));
    table.register(RuleHandler::validator(BeanValidator));
    table.register(RuleHandler::validator(ArrayValidator));
    table.register(RuleHandler::converter(DecimalConverter));
    table.register(RuleHandler::processor(ComputedTotalProcessor));
    Ok(())
}

/// A handler table holding exactly the built-in rules.
pub fn builtin_handlers(cities: Arc<dyn CityDirectory>) -> Result<HandlerTable, RulesError> {
    let mut table = HandlerTable::new();
    register_builtins(&mut table, cities)?;
    Ok(table)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use sa_engine::{HandlerTable, RuleHandler, Session};

    pub fn session_with(handlers: impl IntoIterator<Item = RuleHandler>) -> Session {
        let mut table = HandlerTable::new();
        for handler in handlers {
            table.register(handler);
        }
        Session::with_handlers(Arc::new(table))
    }
}
