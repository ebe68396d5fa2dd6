// src/services/notifier.rs

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::models::notification::NotificationEvent;

pub type ConnectionHandle = mpsc::UnboundedSender<NotificationEvent>;

/// Registro explícito de conexões vivas (usuário -> canal de entrega).
/// Substitui o mapa global solto `userSocketMap` do sistema antigo.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<Uuid, ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, user_id: Uuid, handle: ConnectionHandle) {
        self.connections.write().await.insert(user_id, handle);
    }

    pub async fn unregister(&self, user_id: Uuid) {
        self.connections.write().await.remove(&user_id);
    }

    pub async fn lookup(&self, user_id: Uuid) -> Option<ConnectionHandle> {
        self.connections.read().await.get(&user_id).cloned()
    }
}

/// Colaborador de notificações. A entrega é fire-and-forget: o evento só é
/// emitido DEPOIS do commit, e falha de entrega nunca vira erro da operação.
#[derive(Clone, Default)]
pub struct Notifier {
    registry: ConnectionRegistry,
}

impl Notifier {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    pub async fn dispatch(&self, event: NotificationEvent) {
        match self.registry.lookup(event.recipient_user_id).await {
            Some(handle) => {
                if let Err(err) = handle.send(event.clone()) {
                    // Conexão morreu entre o lookup e o envio. Só loga.
                    tracing::error!(
                        booking_id = %event.booking_id,
                        "Falha ao entregar notificação: {err}"
                    );
                    self.registry.unregister(event.recipient_user_id).await;
                }
            }
            None => {
                tracing::debug!(
                    recipient = %event.recipient_user_id,
                    booking_id = %event.booking_id,
                    "Destinatário sem conexão ativa; notificação descartada"
                );
            }
        }
    }
}
