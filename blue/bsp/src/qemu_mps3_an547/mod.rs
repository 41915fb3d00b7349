mod cmsdk_uart;
mod init;
mod irq;
mod sys_config;
mod systick;
mod uart;

#[cfg(feature = "enable_uart0")]
pub use uart::UARTRX0_Handler;
#[cfg(feature = "enable_uart1")]
pub use uart::UARTRX1_Handler;
