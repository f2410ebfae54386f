pub mod pass_card;
pub mod pass_form;
