//! In-memory array used by the session and pool tests.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::XcliClient;
use crate::codec::CommandRequest;
use crate::error::{Result, XcliError};
use crate::protocol::wire_format::HELP_COMMAND;
use crate::protocol::{self, Element};
use crate::transport::Transport;

pub(crate) type Responder = Arc<dyn Fn(&CommandRequest) -> Result<Element> + Send + Sync>;

pub(crate) fn reply(outcome: &str) -> Element {
    let xml = format!(
        r#"<command id="0"><aserver status="DELIVERY_SUCCESSFUL"/><administrator>{}</administrator></command>"#,
        outcome
    );
    protocol::parse(xml.as_bytes()).unwrap()
}

pub(crate) fn success(body: &str) -> Element {
    reply(&format!(
        r#"<command><code value="SUCCESS"/><status value="0"/><status_str value="Command completed successfully"/><return>{}</return></command>"#,
        body
    ))
}

pub(crate) fn failure(code: &str, status_str: &str) -> Element {
    reply(&format!(
        r#"<command><code value="{}"/><status value="3"/><status_str value="{}"/></command>"#,
        code, status_str
    ))
}

pub(crate) fn help_body() -> &'static str {
    r#"<command><name value="vol_list"/><description value="Lists all volumes."/><syntax value="vol_list [ vol=VolName ]"/></command>
       <command><name value="pool_list"/><description value="Lists all storage pools."/><syntax value="pool_list"/></command>"#
}

pub(crate) fn default_reply(request: &CommandRequest) -> Result<Element> {
    if request.command == HELP_COMMAND {
        Ok(success(help_body()))
    } else {
        Ok(success(r#"<volume id="1"><name value="v1"/></volume>"#))
    }
}

/// Records every request and answers through a responder.
#[derive(Clone)]
pub(crate) struct FakeArray {
    responder: Responder,
    requests: Arc<Mutex<Vec<CommandRequest>>>,
    connected: Arc<AtomicBool>,
}

impl FakeArray {
    pub(crate) fn new() -> Self {
        Self::with_responder(default_reply)
    }

    pub(crate) fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CommandRequest) -> Result<Element> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    pub(crate) fn transport(&self) -> Box<dyn Transport> {
        Box::new(FakeTransport {
            array: self.clone(),
        })
    }

    pub(crate) fn client(&self) -> Arc<XcliClient> {
        Arc::new(XcliClient::new(self.transport()))
    }

    pub(crate) fn requests(&self) -> Vec<CommandRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.command.clone()).collect()
    }

    pub(crate) fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

struct FakeTransport {
    array: FakeArray,
}

impl fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeTransport").finish()
    }
}

impl Transport for FakeTransport {
    fn send(&mut self, payload: &[u8]) -> Result<Element> {
        if !self.is_connected() {
            return Err(XcliError::DisconnectedWhileReceiving);
        }
        let request = CommandRequest::from_element(&protocol::parse(payload)?)?;
        let answer = (self.array.responder)(&request);
        self.array.requests.lock().push(request);
        answer
    }

    fn is_connected(&self) -> bool {
        self.array.connected.load(Ordering::SeqCst)
    }

    fn close(&mut self) {
        self.array.connected.store(false, Ordering::SeqCst);
    }

    fn reconnect(&mut self) -> Result<()> {
        self.array.connected.store(true, Ordering::SeqCst);
        Ok(())
    }
}
