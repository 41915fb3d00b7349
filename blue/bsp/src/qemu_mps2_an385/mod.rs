mod cmsdk_uart;
mod init;
mod irq;
mod sys_config;
mod systick;
mod uart;

#[cfg(feature = "enable_uart0")]
pub use uart::UART0RX_Handler;
#[cfg(feature = "enable_uart1")]
pub use uart::UART1RX_Handler;
