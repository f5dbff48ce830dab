//! Dialogue Manager module for handling dialogue state transitions
//!
//! [`DialogueManager::handle_message`] is the single entry point: it takes
//! the text of one inbound message and returns the one reply to send.
//! Cancel and pagination commands work at any time; otherwise a chat that
//! is mid-flow has its text routed to the pending step, and an idle chat
//! has it interpreted as a menu command.

use anyhow::Result;
use dashmap::DashMap;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

// Import localization
use crate::localization::{t, t_args};

// Import dialogue types
use crate::dialogue::{
    parse_id, parse_product_filters, parse_quantity_change, parse_thermocup_payload,
    parse_thermocup_update, InputError, PendingInput, THERMOCUP_FIELD_COUNT,
    THERMOCUP_UPDATE_FIELD_COUNT,
};

use crate::pagination::{PageDirection, ProductListCache};
use crate::session_store::{PendingLookup, SessionStore};
use crate::warehouse_client::WarehouseApi;
use crate::warehouse_errors::WarehouseError;
use crate::warehouse_model::Product;

use super::commands::MenuCommand;

// Import UI builder functions
use super::ui_builder::{
    add_products_menu_message, format_product, format_product_page, format_thermocup_attributes,
    help_message, products_menu_message, thermocup_create_instructions,
    thermocup_update_instructions, update_products_menu_message, welcome_message,
};

/// Which reply keyboard the transport should attach to a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardHint {
    MainMenu,
    ProductsMenu,
    AddProductsMenu,
    UpdateProductsMenu,
    Pagination,
    Cancel,
}

/// The single reply to an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub keyboard: KeyboardHint,
}

impl BotReply {
    pub fn new(text: impl Into<String>, keyboard: KeyboardHint) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }
}

/// Conversation state machine shared by all chats
pub struct DialogueManager {
    warehouse: Arc<dyn WarehouseApi>,
    sessions: Arc<dyn SessionStore>,
    page_size: usize,
    /// Serializes messages of the same chat; different chats never share a lock
    chat_locks: DashMap<ChatId, Arc<Mutex<()>>>,
}

impl DialogueManager {
    pub fn new(
        warehouse: Arc<dyn WarehouseApi>,
        sessions: Arc<dyn SessionStore>,
        page_size: usize,
    ) -> Self {
        Self {
            warehouse,
            sessions,
            page_size: page_size.max(1),
            chat_locks: DashMap::new(),
        }
    }

    /// Handle one inbound text message and produce its reply.
    ///
    /// Never fails: upstream errors become a generic failure text and any
    /// other error is logged and answered with an apology.
    pub async fn handle_message(&self, chat_id: ChatId, text: &str) -> BotReply {
        let lock = self.chat_lock(chat_id);
        let _guard = lock.lock().await;

        debug!(chat_id = %chat_id, message_length = text.len(), "Handling message");

        let mut reply = match self.route(chat_id, text).await {
            Ok(reply) => reply,
            Err(e) => match e.downcast_ref::<WarehouseError>() {
                Some(upstream) => {
                    warn!(chat_id = %chat_id, error = %upstream, "Warehouse request failed");
                    BotReply::new(t("error-upstream"), KeyboardHint::MainMenu)
                }
                None => {
                    error!(chat_id = %chat_id, error = %e, "Failed to handle message");
                    BotReply::new(t("error-internal"), KeyboardHint::MainMenu)
                }
            },
        };

        // A chat mid-flow always gets the cancel keyboard
        if self.sessions.pending(chat_id).is_some() {
            reply.keyboard = KeyboardHint::Cancel;
        }
        reply
    }

    /// Drop idle sessions and the locks of chats with no message in flight
    pub fn sweep_idle(&self) -> usize {
        let evicted = self.sessions.evict_idle();
        self.chat_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        if evicted > 0 {
            info!(evicted, "Evicted idle chat sessions");
        }
        evicted
    }

    fn chat_lock(&self, chat_id: ChatId) -> Arc<Mutex<()>> {
        Arc::clone(
            self.chat_locks
                .entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    async fn route(&self, chat_id: ChatId, text: &str) -> Result<BotReply> {
        let command = MenuCommand::parse(text);

        // These work whether or not the chat is mid-flow
        match command {
            Some(MenuCommand::Cancel) => return Ok(self.cancel(chat_id)),
            Some(MenuCommand::NextPage) => return Ok(self.turn_page(chat_id, PageDirection::Next)),
            Some(MenuCommand::PreviousPage) => {
                return Ok(self.turn_page(chat_id, PageDirection::Previous))
            }
            _ => {}
        }

        match self.sessions.take_pending(chat_id) {
            PendingLookup::Active(pending) => {
                debug!(chat_id = %chat_id, pending = ?pending, "Routing input to pending step");
                self.handle_pending(chat_id, pending, text).await
            }
            PendingLookup::Expired(pending) => {
                info!(chat_id = %chat_id, pending = ?pending, "Session expired before input arrived");
                Ok(BotReply::new(t("error-session-expired"), KeyboardHint::MainMenu))
            }
            PendingLookup::Idle => match command {
                Some(command) => self.handle_command(chat_id, command).await,
                None => Ok(BotReply::new(t("unknown-command"), KeyboardHint::MainMenu)),
            },
        }
    }

    async fn handle_command(&self, chat_id: ChatId, command: MenuCommand) -> Result<BotReply> {
        let reply = match command {
            MenuCommand::Start | MenuCommand::BackToMainMenu => {
                BotReply::new(welcome_message(), KeyboardHint::MainMenu)
            }
            MenuCommand::Help => BotReply::new(help_message(), KeyboardHint::MainMenu),
            MenuCommand::Cancel => self.cancel(chat_id),
            MenuCommand::NextPage => self.turn_page(chat_id, PageDirection::Next),
            MenuCommand::PreviousPage => self.turn_page(chat_id, PageDirection::Previous),
            MenuCommand::GetProducts => {
                BotReply::new(products_menu_message(), KeyboardHint::ProductsMenu)
            }
            MenuCommand::AllProducts => {
                let products = self.warehouse.fetch_products(&[]).await?;
                self.show_listing(chat_id, products)
            }
            MenuCommand::ProductsById => {
                self.prompt(chat_id, PendingInput::AwaitingProductId, t("prompt-product-id"))
            }
            MenuCommand::ThermocupsById => self.prompt(
                chat_id,
                PendingInput::AwaitingThermocupId,
                t("prompt-thermocup-id"),
            ),
            MenuCommand::SearchByFilter => self.prompt(
                chat_id,
                PendingInput::AwaitingProductFilter,
                format!("{}\n{}", t("prompt-filter"), t("prompt-filter-example")),
            ),
            MenuCommand::AddNewProducts => {
                BotReply::new(add_products_menu_message(), KeyboardHint::AddProductsMenu)
            }
            MenuCommand::AddThermalMug => self.prompt(
                chat_id,
                PendingInput::AwaitingThermocupCreate,
                thermocup_create_instructions(),
            ),
            MenuCommand::UpdateProducts => {
                BotReply::new(update_products_menu_message(), KeyboardHint::UpdateProductsMenu)
            }
            MenuCommand::UpdateThermalMug => self.prompt(
                chat_id,
                PendingInput::AwaitingThermocupUpdate,
                thermocup_update_instructions(),
            ),
            MenuCommand::UpdateReservedQuantity => self.prompt(
                chat_id,
                PendingInput::AwaitingReservedProductId,
                t("prompt-reserved-product-id"),
            ),
            MenuCommand::UpdateStockQuantity => self.prompt(
                chat_id,
                PendingInput::AwaitingStockProductId,
                t("prompt-stock-product-id"),
            ),
        };
        Ok(reply)
    }

    /// Handle input for a pending step. The tag has already been taken from
    /// the store, so any step that wants to continue must set it again.
    async fn handle_pending(
        &self,
        chat_id: ChatId,
        pending: PendingInput,
        text: &str,
    ) -> Result<BotReply> {
        match pending {
            PendingInput::AwaitingProductId => match parse_id(text) {
                Ok(product_id) => self.lookup_product(product_id).await,
                Err(_) => Ok(BotReply::new(t("error-invalid-number"), KeyboardHint::ProductsMenu)),
            },
            PendingInput::AwaitingThermocupId => match parse_id(text) {
                Ok(product_id) => self.lookup_thermocup(product_id).await,
                Err(_) => Ok(BotReply::new(t("error-invalid-number"), KeyboardHint::ProductsMenu)),
            },
            PendingInput::AwaitingProductFilter => match parse_product_filters(text) {
                Ok(filters) => {
                    let products = self.warehouse.fetch_products(&filters).await?;
                    Ok(self.show_listing(chat_id, products))
                }
                Err(_) => Ok(BotReply::new(t("error-invalid-filter"), KeyboardHint::ProductsMenu)),
            },
            PendingInput::AwaitingThermocupCreate => match parse_thermocup_payload(text) {
                Ok(draft) => {
                    let product_id = self.warehouse.create_thermocup(&draft).await?;
                    info!(chat_id = %chat_id, product_id, "Thermocup created from chat");
                    Ok(BotReply::new(
                        t_args("thermocup-created", &[("product", &product_id.to_string())]),
                        KeyboardHint::MainMenu,
                    ))
                }
                Err(e) => {
                    debug!(chat_id = %chat_id, error = %e, "Rejected thermocup payload");
                    let count = THERMOCUP_FIELD_COUNT.to_string();
                    Ok(BotReply::new(
                        t_args("error-invalid-format", &[("count", &count)]),
                        KeyboardHint::AddProductsMenu,
                    ))
                }
            },
            PendingInput::AwaitingThermocupUpdate => match parse_thermocup_update(text) {
                Ok((product_id, update)) => {
                    match self.warehouse.update_thermocup(product_id, &update).await {
                        Ok(()) => {
                            info!(chat_id = %chat_id, product_id, "Thermocup updated from chat");
                            Ok(BotReply::new(
                                t_args("thermocup-updated", &[("product", &product_id.to_string())]),
                                KeyboardHint::UpdateProductsMenu,
                            ))
                        }
                        Err(e) if e.is_not_found() => Ok(BotReply::new(
                            t("error-thermocup-not-found"),
                            KeyboardHint::UpdateProductsMenu,
                        )),
                        Err(e) => Err(e.into()),
                    }
                }
                Err(e) => {
                    debug!(chat_id = %chat_id, error = %e, "Rejected thermocup update");
                    let count = THERMOCUP_UPDATE_FIELD_COUNT.to_string();
                    Ok(BotReply::new(
                        t_args("error-invalid-format", &[("count", &count)]),
                        KeyboardHint::UpdateProductsMenu,
                    ))
                }
            },
            PendingInput::AwaitingStockProductId => {
                self.accept_product_id(chat_id, pending, text, |product| {
                    let product_id = product_id_of(product);
                    (
                        PendingInput::AwaitingStockWarehouseId { product_id },
                        t_args(
                            "prompt-stock-warehouse-id",
                            &[("product", &product_id.to_string())],
                        ),
                    )
                })
                .await
            }
            PendingInput::AwaitingStockWarehouseId { product_id } => match parse_id(text) {
                Ok(warehouse_id) => Ok(self.prompt(
                    chat_id,
                    PendingInput::AwaitingStockQuantity {
                        product_id,
                        warehouse_id,
                    },
                    t_args(
                        "prompt-stock-quantity",
                        &[
                            ("product", &product_id.to_string()),
                            ("warehouse", &warehouse_id.to_string()),
                        ],
                    ),
                )),
                Err(_) => Ok(self.prompt(chat_id, pending, t("error-invalid-number-retry"))),
            },
            PendingInput::AwaitingStockQuantity {
                product_id,
                warehouse_id,
            } => match parse_quantity_change(text) {
                Ok(quantity_change) => {
                    self.warehouse
                        .update_stock(product_id, warehouse_id, quantity_change)
                        .await?;
                    info!(chat_id = %chat_id, product_id, warehouse_id, quantity_change, "Stock update flow completed");
                    Ok(BotReply::new(
                        t_args(
                            "stock-updated",
                            &[
                                ("product", &product_id.to_string()),
                                ("warehouse", &warehouse_id.to_string()),
                                ("change", &format!("{quantity_change:+}")),
                            ],
                        ),
                        KeyboardHint::UpdateProductsMenu,
                    ))
                }
                Err(e) => Ok(self.reject_quantity(chat_id, pending, e)),
            },
            PendingInput::AwaitingReservedProductId => {
                self.accept_product_id(chat_id, pending, text, |product| {
                    let product_id = product_id_of(product);
                    (
                        PendingInput::AwaitingReservedQuantity { product_id },
                        t_args(
                            "prompt-reserved-quantity",
                            &[("product", &product_id.to_string())],
                        ),
                    )
                })
                .await
            }
            PendingInput::AwaitingReservedQuantity { product_id } => {
                match parse_quantity_change(text) {
                    Ok(quantity_change) => {
                        self.warehouse
                            .update_reserved(product_id, quantity_change)
                            .await?;
                        info!(chat_id = %chat_id, product_id, quantity_change, "Reserved update flow completed");
                        Ok(BotReply::new(
                            t_args(
                                "reserved-updated",
                                &[
                                    ("product", &product_id.to_string()),
                                    ("change", &format!("{quantity_change:+}")),
                                ],
                            ),
                            KeyboardHint::UpdateProductsMenu,
                        ))
                    }
                    Err(e) => Ok(self.reject_quantity(chat_id, pending, e)),
                }
            }
        }
    }

    /// First step of the stock and reserved flows: the product must exist.
    /// An unknown id or a non-numeric input re-prompts the same step.
    async fn accept_product_id<F>(
        &self,
        chat_id: ChatId,
        pending: PendingInput,
        text: &str,
        next_step: F,
    ) -> Result<BotReply>
    where
        F: FnOnce(&Product) -> (PendingInput, String) + Send,
    {
        let product_id = match parse_id(text) {
            Ok(id) => id,
            Err(_) => return Ok(self.prompt(chat_id, pending, t("error-invalid-number-retry"))),
        };

        match self.warehouse.fetch_product(product_id).await {
            Ok(mut product) => {
                product.id.get_or_insert(product_id);
                let (next, prompt) = next_step(&product);
                Ok(self.prompt(chat_id, next, prompt))
            }
            Err(e) if e.is_not_found() => {
                debug!(chat_id = %chat_id, product_id, "Product not found, asking again");
                Ok(self.prompt(
                    chat_id,
                    pending,
                    t_args(
                        "error-product-not-found-retry",
                        &[("product", &product_id.to_string())],
                    ),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn reject_quantity(&self, chat_id: ChatId, pending: PendingInput, error: InputError) -> BotReply {
        let message = match error {
            InputError::ZeroQuantity => t("error-zero-quantity"),
            _ => t("error-invalid-number-retry"),
        };
        self.prompt(chat_id, pending, message)
    }

    async fn lookup_product(&self, product_id: i64) -> Result<BotReply> {
        let product = match self.warehouse.fetch_product(product_id).await {
            Ok(product) => product,
            Err(e) if e.is_not_found() => {
                return Ok(BotReply::new(t("error-product-not-found"), KeyboardHint::ProductsMenu))
            }
            Err(e) => return Err(e.into()),
        };

        let attributes = match self.warehouse.fetch_category_attributes(&product).await {
            Ok(attributes) => Some(attributes),
            Err(e) => {
                warn!(product_id, error = %e, "Category attributes unavailable");
                None
            }
        };

        Ok(BotReply::new(
            format_product(&product, attributes.as_ref()),
            KeyboardHint::ProductsMenu,
        ))
    }

    async fn lookup_thermocup(&self, product_id: i64) -> Result<BotReply> {
        match self.warehouse.fetch_thermocup_attributes(product_id).await {
            Ok(attributes) => Ok(BotReply::new(
                format_thermocup_attributes(&attributes),
                KeyboardHint::ProductsMenu,
            )),
            Err(e) if e.is_not_found() => Ok(BotReply::new(
                t("error-thermocup-not-found"),
                KeyboardHint::ProductsMenu,
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the chat's listing with a fresh one and show its first page
    fn show_listing(&self, chat_id: ChatId, products: Vec<Product>) -> BotReply {
        match ProductListCache::new(products, self.page_size) {
            Some(listing) => {
                let text = format_product_page(&listing);
                debug!(chat_id = %chat_id, total = listing.total_products(), "Cached product listing");
                self.sessions.set_listing(chat_id, listing);
                BotReply::new(text, KeyboardHint::Pagination)
            }
            None => {
                self.sessions.clear_listing(chat_id);
                BotReply::new(t("products-empty"), KeyboardHint::ProductsMenu)
            }
        }
    }

    fn turn_page(&self, chat_id: ChatId, direction: PageDirection) -> BotReply {
        match self.sessions.turn_page(chat_id, direction) {
            Some((listing, moved)) => {
                let page = format_product_page(&listing);
                let text = if moved {
                    page
                } else {
                    let notice = match direction {
                        PageDirection::Next => t("products-last-page"),
                        PageDirection::Previous => t("products-first-page"),
                    };
                    format!("{notice}\n\n{page}")
                };
                BotReply::new(text, KeyboardHint::Pagination)
            }
            None => BotReply::new(t("error-no-list-session"), KeyboardHint::ProductsMenu),
        }
    }

    fn cancel(&self, chat_id: ChatId) -> BotReply {
        let message = if self.sessions.pending(chat_id).is_some() {
            self.sessions.clear_pending(chat_id);
            t("cancelled")
        } else {
            t("nothing-to-cancel")
        };
        BotReply::new(message, KeyboardHint::MainMenu)
    }

    /// Set the chat's pending input and ask for it
    fn prompt(&self, chat_id: ChatId, pending: PendingInput, message: String) -> BotReply {
        self.sessions.set_pending(chat_id, pending);
        BotReply::new(message, KeyboardHint::Cancel)
    }
}

fn product_id_of(product: &Product) -> i64 {
    product.id.unwrap_or_default()
}
