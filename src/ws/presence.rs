// src/ws/presence.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::ServerEvent;

/// Uma conexão ativa: o id do socket e o canal que escreve nele.
#[derive(Clone)]
struct Connection {
    connection_id: Uuid,
    sender: mpsc::Sender<ServerEvent>,
}

/// Mapa de presença: usuário conectado -> conexão ativa.
///
/// Uma única instância vive no `AppState` durante todo o processo. O mapa
/// nunca é exposto; só existem `register`, `unregister`, `lookup` e os
/// envios. Processo único: sem coordenação distribuída.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    inner: Arc<Mutex<HashMap<Uuid, Connection>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra a conexão autenticada do usuário. Se já havia uma conexão
    /// registrada, a nova a substitui (a última conexão vence).
    pub fn register(&self, user_id: Uuid, connection_id: Uuid, sender: mpsc::Sender<ServerEvent>) {
        let mut map = self.inner.lock().expect("presence lock poisoned");
        if map
            .insert(user_id, Connection { connection_id, sender })
            .is_some()
        {
            tracing::debug!(%user_id, "Conexão anterior substituída pela nova");
        }
    }

    /// Remove o mapeamento apenas se a conexão armazenada for a mesma que
    /// está desconectando. O disconnect atrasado de uma conexão já
    /// substituída não derruba a conexão viva.
    pub fn unregister(&self, user_id: Uuid, connection_id: Uuid) {
        let mut map = self.inner.lock().expect("presence lock poisoned");
        if let Some(current) = map.get(&user_id) {
            if current.connection_id == connection_id {
                map.remove(&user_id);
            }
        }
    }

    /// Id da conexão ativa do usuário, se houver.
    pub fn lookup(&self, user_id: Uuid) -> Option<Uuid> {
        let map = self.inner.lock().expect("presence lock poisoned");
        map.get(&user_id).map(|c| c.connection_id)
    }

    /// Envia um evento ao usuário se ele estiver conectado. Fire-and-forget:
    /// fila cheia ou socket fechando são silenciosamente descartados; a
    /// linha persistida continua sendo a fonte da verdade.
    pub fn push(&self, user_id: Uuid, event: ServerEvent) -> bool {
        let sender = {
            let map = self.inner.lock().expect("presence lock poisoned");
            map.get(&user_id).map(|c| c.sender.clone())
        };

        match sender {
            Some(tx) => tx.try_send(event).is_ok(),
            None => false,
        }
    }

    /// Envia o mesmo evento a todos os conectados (sinal de refresh).
    pub fn broadcast(&self, event: ServerEvent) {
        // Clona os senders fora do lock para não segurar o mutex durante o envio
        let senders: Vec<mpsc::Sender<ServerEvent>> = {
            let map = self.inner.lock().expect("presence lock poisoned");
            map.values().map(|c| c.sender.clone()).collect()
        };

        for tx in senders {
            let _ = tx.try_send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (mpsc::Sender<ServerEvent>, mpsc::Receiver<ServerEvent>) {
        mpsc::channel(8)
    }

    #[tokio::test]
    async fn registro_e_lookup() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let conn = Uuid::new_v4();
        let (tx, _rx) = channel();

        assert_eq!(registry.lookup(user), None);
        registry.register(user, conn, tx);
        assert_eq!(registry.lookup(user), Some(conn));
    }

    #[tokio::test]
    async fn ultima_conexao_vence() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        let (tx1, _rx1) = channel();
        let (tx2, mut rx2) = channel();

        registry.register(user, c1, tx1);
        registry.register(user, c2, tx2);

        assert_eq!(registry.lookup(user), Some(c2));
        assert!(registry.push(user, ServerEvent::AppointmentsChanged));
        assert!(matches!(rx2.try_recv(), Ok(ServerEvent::AppointmentsChanged)));
    }

    #[tokio::test]
    async fn disconnect_atrasado_nao_derruba_conexao_nova() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();

        registry.register(user, c1, tx1);
        registry.register(user, c2, tx2);
        // O socket antigo (c1) fecha depois que c2 já assumiu
        registry.unregister(user, c1);

        assert_eq!(registry.lookup(user), Some(c2));
    }

    #[tokio::test]
    async fn unregister_da_conexao_ativa_remove() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let conn = Uuid::new_v4();
        let (tx, _rx) = channel();

        registry.register(user, conn, tx);
        registry.unregister(user, conn);

        assert_eq!(registry.lookup(user), None);
        assert!(!registry.push(user, ServerEvent::AppointmentsChanged));
    }

    #[tokio::test]
    async fn broadcast_alcanca_todos_os_conectados() {
        let registry = PresenceRegistry::new();
        let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();

        registry.register(u1, Uuid::new_v4(), tx1);
        registry.register(u2, Uuid::new_v4(), tx2);

        registry.broadcast(ServerEvent::AppointmentsChanged);

        assert!(matches!(rx1.try_recv(), Ok(ServerEvent::AppointmentsChanged)));
        assert!(matches!(rx2.try_recv(), Ok(ServerEvent::AppointmentsChanged)));
    }
}
